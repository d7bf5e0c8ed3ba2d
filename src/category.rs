//! Interest labels → question-bank taxonomy labels, plus the tracks we offer.

/// Tracks offered on the interests screen, matched by name against the catalog.
pub const TARGET_INTERESTS: [&str; 12] = [
  "AI Engineer",
  "Android Developer",
  "Back-End Developer JavaScript",
  "Data Scientist",
  "DevOps Engineer",
  "Front-End Web Developer",
  "Gen AI Engineer",
  "Google Cloud Professional",
  "iOS Developer",
  "MLOps Engineer",
  "Multi-Platform App Developer",
  "React Developer",
];

/// Interest display name → taxonomy label used by the question bank.
const CATEGORY_MAP: &[(&str, &str)] = &[
  ("AI Engineer", "Machine Learning"),
  ("Android Developer", "Android"),
  ("Back-End Developer JavaScript", "Web"),
  ("Back-End Developer Python", "machine learning"),
  ("Data Scientist", "Data"),
  ("DevOps Engineer", "Cloud Computing"),
  ("Front-End Web Developer", "Web"),
  ("Gen AI Engineer", "Machine Learning"),
  ("Google Cloud Professional", "Cloud Computing"),
  ("iOS Developer", "iOS"),
  ("MLOps Engineer", "Machine Learning"),
  ("Multi-Platform App Developer", "Mobile"),
  ("React Developer", "Web"),
];

/// Resolve an interest label to its taxonomy label. Unmapped labels resolve to themselves.
pub fn resolve(display_label: &str) -> &str {
  CATEGORY_MAP
    .iter()
    .find(|(name, _)| *name == display_label)
    .map(|(_, label)| *label)
    .unwrap_or(display_label)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn maps_known_interests() {
    assert_eq!(resolve("Android Developer"), "Android");
    assert_eq!(resolve("DevOps Engineer"), "Cloud Computing");
    assert_eq!(resolve("Back-End Developer Python"), "machine learning");
  }

  #[test]
  fn unknown_interest_falls_back_to_itself() {
    assert_eq!(resolve("Rust Developer"), "Rust Developer");
  }

  #[test]
  fn lookup_is_exact() {
    assert_eq!(resolve("android developer"), "android developer");
  }

  #[test]
  fn every_target_interest_is_mapped() {
    for name in TARGET_INTERESTS {
      assert!(CATEGORY_MAP.iter().any(|(n, _)| *n == name), "{name} has no mapping");
    }
  }
}
