//! Score ratio → proficiency tier, and tier → catalog level ordinal.

use crate::domain::ProficiencyTier;

/// Ratio at or above which a learner is placed at `Intermediate`.
pub const INTERMEDIATE_THRESHOLD: f64 = 0.6;

/// Classify a score. `total == 0` is treated as a zero ratio.
pub fn classify(score: u32, total: u32) -> ProficiencyTier {
  if total == 0 {
    return ProficiencyTier::Basic;
  }
  let ratio = f64::from(score) / f64::from(total);
  if ratio >= INTERMEDIATE_THRESHOLD {
    ProficiencyTier::Intermediate
  } else {
    ProficiencyTier::Basic
  }
}

impl ProficiencyTier {
  /// Level ordinal used by the catalog's `course_level_str` column (sparse: 1, 3).
  pub fn level_ordinal(self) -> u8 {
    match self {
      ProficiencyTier::Basic => 1,
      ProficiencyTier::Intermediate => 3,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      ProficiencyTier::Basic => "Basic",
      ProficiencyTier::Intermediate => "Intermediate",
    }
  }
}
