//! Structured facts handed to the narration service, and their rendering into an
//! instruction blob.
//!
//! The builder never truncates `missed`: the narration backend is told to pick a couple of
//! mistakes to emphasize, and gets the length budget as a hint.

use serde::Serialize;
use tracing::{error, instrument, warn};

use crate::config::Prompts;
use crate::domain::{Course, GradeResult, MissedQuestion, ProficiencyTier};
use crate::error::NarrationError;
use crate::sources::Narrator;
use crate::util::fill_template;

/// Length and emphasis hints passed along with the facts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LengthBudget {
  pub max_paragraphs: u8,
  pub emphasize_min: u8,
  pub emphasize_max: u8,
  pub skill_keywords: u8,
}

impl Default for LengthBudget {
  fn default() -> Self {
    Self { max_paragraphs: 3, emphasize_min: 1, emphasize_max: 2, skill_keywords: 6 }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NarrationPayload {
  pub category: String,
  pub score: u32,
  pub total: u32,
  pub tier: ProficiencyTier,
  pub missed: Vec<MissedQuestion>,
  pub course_name: String,
  pub budget: LengthBudget,
}

pub fn build_narration_facts(
  category: &str,
  grade: &GradeResult,
  tier: ProficiencyTier,
  course: &Course,
) -> NarrationPayload {
  NarrationPayload {
    category: category.to_string(),
    score: grade.score,
    total: grade.total,
    tier,
    missed: grade.missed.clone(),
    course_name: course.name.clone(),
    budget: LengthBudget::default(),
  }
}

impl NarrationPayload {
  /// Render into the feedback instruction text using the configured template.
  pub fn render(&self, prompts: &Prompts) -> String {
    let missed = if self.missed.is_empty() { prompts.all_correct_text.clone() } else { render_missed(&self.missed) };
    let emphasis = format!("{} or {}", self.budget.emphasize_min, self.budget.emphasize_max);
    fill_template(
      &prompts.feedback_template,
      &[
        ("category", &self.category),
        ("score", &self.score.to_string()),
        ("total", &self.total.to_string()),
        ("tier", self.tier.label()),
        ("course", &self.course_name),
        ("missed", &missed),
        ("emphasis", &emphasis),
        ("max_paragraphs", &self.budget.max_paragraphs.to_string()),
        ("skills", &self.budget.skill_keywords.to_string()),
      ],
    )
  }
}

fn render_missed(missed: &[MissedQuestion]) -> String {
  missed
    .iter()
    .map(|m| {
      format!(
        "- Question: {}\n  Your answer: {} (wrong)\n  Correct answer: {}",
        m.question_prompt, m.selected_option, m.correct_option
      )
    })
    .collect::<Vec<_>>()
    .join("\n")
}

/// Narrated text, or the placeholder when narration is disabled or fails.
pub struct Narration {
  pub text: String,
  pub degraded: bool,
}

/// Ask the narrator for prose; any failure (a missing narrator included) is absorbed into
/// the `fallback` text.
#[instrument(level = "info", skip_all, fields(instructions_len = instructions.len()))]
pub async fn narrate_or_placeholder(
  narrator: Option<&dyn Narrator>,
  prompts: &Prompts,
  instructions: &str,
  fallback: &str,
) -> Narration {
  let result = match narrator {
    Some(narrator) => narrator.narrate(&prompts.narration_system, instructions).await,
    None => Err(NarrationError::Disabled),
  };
  match result {
    Ok(text) => Narration { text, degraded: false },
    Err(NarrationError::Disabled) => {
      warn!(target: "recommend", "Narration disabled; returning placeholder");
      Narration { text: fallback.to_string(), degraded: true }
    }
    Err(e) => {
      error!(target: "recommend", error = %e, "Narration failed; returning placeholder");
      Narration { text: fallback.to_string(), degraded: true }
    }
  }
}
