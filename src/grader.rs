//! Grading a submission against the canonical answer keys.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, warn};

use crate::domain::{AnswerKey, GradeResult, MissedQuestion, QuestionAnswer};
use crate::error::EngineError;
use crate::sources::QuestionBank;

/// Fetch the answer keys for the submitted ids (one query) and score the answers.
#[instrument(level = "info", skip(bank, answers), fields(answers = answers.len()))]
pub async fn grade(bank: &dyn QuestionBank, answers: &[QuestionAnswer]) -> Result<GradeResult, EngineError> {
  if answers.is_empty() {
    return Err(EngineError::InvalidInput("no answers submitted".into()));
  }

  let mut seen = HashSet::new();
  let ids: Vec<i64> = answers.iter().map(|a| a.question_id).filter(|id| seen.insert(*id)).collect();

  let keys = bank.answer_keys(&ids).await?;
  if keys.is_empty() {
    return Err(EngineError::NotFound("submitted quiz questions no longer exist".into()));
  }

  let result = score_answers(answers, &keys);
  if result.total < answers.len() as u32 {
    warn!(target: "quiz", submitted = answers.len(), matched = result.total, "Skipped answers with unknown question ids");
  }
  debug!(target: "quiz", score = result.score, total = result.total, missed = result.missed.len(), "Submission graded");
  Ok(result)
}

/// Pure scoring step. Answers whose id has no key are neither scored nor counted.
/// Comparison is exact and case-sensitive; duplicate ids are graded independently.
pub fn score_answers(answers: &[QuestionAnswer], keys: &[AnswerKey]) -> GradeResult {
  let lookup: HashMap<i64, &AnswerKey> = keys.iter().map(|k| (k.question_id, k)).collect();

  let mut result = GradeResult::default();
  for answer in answers {
    let Some(key) = lookup.get(&answer.question_id) else { continue };
    result.total += 1;
    if answer.selected_option == key.correct_option {
      result.score += 1;
    } else {
      result.missed.push(MissedQuestion {
        question_prompt: key.prompt.clone(),
        selected_option: answer.selected_option.clone(),
        correct_option: key.correct_option.clone(),
      });
    }
  }
  result
}
