//! Domain models: interests, quiz questions, answer keys, grading results, tiers and courses.
//!
//! Everything here is transient: built per request from upstream rows and dropped
//! once the response is produced.

use serde::{Deserialize, Serialize};

/// A career/technology track offered by the catalog (e.g. "Android Developer").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestCategory {
  pub id: i64,
  pub name: String,
}

/// Difficulty tier of a quiz question. Also used as the learner's declared level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Beginner,
  Intermediate,
  Advanced,
}

impl Difficulty {
  /// Fixed serving order of tiers in a quiz.
  pub const ALL: [Difficulty; 3] = [Difficulty::Beginner, Difficulty::Intermediate, Difficulty::Advanced];

  /// Value stored in the question bank's `difficulty` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Beginner => "beginner",
      Difficulty::Intermediate => "intermediate",
      Difficulty::Advanced => "advanced",
    }
  }
}

impl std::fmt::Display for Difficulty {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A quiz question as served to the learner. Carries no answer key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
  pub id: i64,
  pub prompt: String,
  pub options: [String; 4],
  pub difficulty: Difficulty,
  pub taxonomy_label: String,
}

/// Up to `QUESTIONS_PER_TIER` questions for each difficulty, ordered beginner → advanced.
#[derive(Clone, Debug, Default, Serialize)]
pub struct QuizSet {
  pub questions: Vec<QuizQuestion>,
}

impl QuizSet {
  pub fn is_empty(&self) -> bool {
    self.questions.is_empty()
  }

  pub fn count_for(&self, difficulty: Difficulty) -> usize {
    self.questions.iter().filter(|q| q.difficulty == difficulty).count()
  }
}

/// Canonical grading record for one question (grading-only).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerKey {
  pub question_id: i64,
  pub prompt: String,
  pub correct_option: String,
}

/// One submitted answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
  pub question_id: i64,
  pub selected_option: String,
}

/// A full quiz submission as received from the caller.
#[derive(Clone, Debug)]
pub struct Submission {
  pub interest: String,
  pub declared_level: Difficulty,
  pub answers: Vec<QuestionAnswer>,
}

/// A question the learner got wrong, kept verbatim for narration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MissedQuestion {
  pub question_prompt: String,
  pub selected_option: String,
  pub correct_option: String,
}

/// Outcome of grading. `score + missed.len() == total` always holds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GradeResult {
  pub score: u32,
  pub total: u32,
  pub missed: Vec<MissedQuestion>,
}

/// Coarse proficiency classification derived from the score ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyTier {
  Basic,
  Intermediate,
}

/// Recommended course. `id` is absent when only the generic fallback is available.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Course {
  pub id: Option<i64>,
  pub name: String,
}
