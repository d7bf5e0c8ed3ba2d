//! Core operations behind the HTTP handlers.
//!
//! - `list_interests`: tracks offered on the interests screen
//! - `get_quiz`: interest → taxonomy label → sampled quiz
//! - `submit_quiz`: grade → classify → recommend course → narrate
//! - `answer_question` / `summarize_progress`: narration-backed helpers
//!
//! Each call is stateless; the sequential stages of `submit_quiz` depend on each other and
//! run in order.

use tracing::{info, instrument, warn};

use crate::category::{self, TARGET_INTERESTS};
use crate::course::resolve_course;
use crate::domain::{Course, GradeResult, InterestCategory, ProficiencyTier, QuizSet, Submission};
use crate::error::EngineError;
use crate::grader::grade;
use crate::narration::{build_narration_facts, narrate_or_placeholder};
use crate::proficiency::classify;
use crate::sampler::sample;
use crate::state::AppState;
use crate::util::{fill_template, trunc_for_log};

const TUTORIAL_CONTEXT_LIMIT: usize = 3;

/// Everything `submit_quiz` computed, plus the narration (possibly a placeholder).
#[derive(Debug)]
pub struct SubmissionOutcome {
  pub grade: GradeResult,
  pub tier: ProficiencyTier,
  pub course: Course,
  pub narration: String,
  pub narration_degraded: bool,
}

#[instrument(level = "info", skip(state))]
pub async fn list_interests(state: &AppState) -> Result<Vec<InterestCategory>, EngineError> {
  let interests = state.catalog.interests(&TARGET_INTERESTS).await?;
  if interests.is_empty() {
    return Err(EngineError::NotFound("learning path list is empty".into()));
  }
  Ok(interests)
}

#[instrument(level = "info", skip(state), fields(%interest))]
pub async fn get_quiz(state: &AppState, interest: &str) -> Result<QuizSet, EngineError> {
  let interest = validate_interest(interest)?;
  let label = category::resolve(interest);
  info!(target: "quiz", %interest, %label, "Resolved interest to taxonomy label");
  sample(state.bank.as_ref(), label, &state.tuning).await.map_err(|e| match e {
    EngineError::NotFound(_) => EngineError::NotFound(format!("no quiz for '{interest}' (category '{label}')")),
    other => other,
  })
}

#[instrument(level = "info", skip(state, submission), fields(interest = %submission.interest, level = %submission.declared_level, answers = submission.answers.len()))]
pub async fn submit_quiz(state: &AppState, submission: &Submission) -> Result<SubmissionOutcome, EngineError> {
  let interest = validate_interest(&submission.interest)?;

  let grade = grade(state.bank.as_ref(), &submission.answers).await?;
  if grade.total == 0 {
    warn!(target: "quiz", %interest, "No submitted question id matched an answer key; classifying as Basic");
  }

  let tier = classify(grade.score, grade.total);
  let course = resolve_course(state.catalog.as_ref(), interest, tier).await;

  let facts = build_narration_facts(interest, &grade, tier, &course);
  let narration = narrate_or_placeholder(state.narrator(), &state.prompts, &facts.render(&state.prompts), &state.prompts.placeholder_text).await;

  info!(
    target: "recommend",
    %interest, score = grade.score, total = grade.total, tier = tier.label(),
    course = %course.name, narration_degraded = narration.degraded,
    "Submission processed"
  );

  Ok(SubmissionOutcome {
    grade,
    tier,
    course,
    narration: narration.text,
    narration_degraded: narration.degraded,
  })
}

/// Tone presets for `answer_question`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
  #[default]
  #[serde(alias = "to the point")]
  ToThePoint,
  #[serde(alias = "santai")]
  Casual,
}

/// Answer a technical question, using matching tutorial titles as context.
#[instrument(level = "info", skip(state, question), fields(question_len = question.len()))]
pub async fn answer_question(state: &AppState, question: &str, tone: Tone) -> Result<String, EngineError> {
  let question = question.trim();
  if question.is_empty() {
    return Err(EngineError::InvalidInput("question must not be empty".into()));
  }

  let prompts = &state.prompts;
  let context = match state.catalog.tutorial_titles(question, TUTORIAL_CONTEXT_LIMIT).await {
    Ok(titles) if !titles.is_empty() => format!("Course material:\n- {}", titles.join("\n- ")),
    Ok(_) => prompts.ask_no_context_text.clone(),
    Err(e) => {
      warn!(target: "learnbuddy", error = %e, "Tutorial lookup failed; answering without context");
      prompts.ask_no_context_text.clone()
    }
  };
  info!(target: "learnbuddy", context = %trunc_for_log(&context, 200), "Question context assembled");

  let tone_text = match tone {
    Tone::ToThePoint => &prompts.ask_tone_to_the_point,
    Tone::Casual => &prompts.ask_tone_casual,
  };
  let instructions = fill_template(
    &prompts.ask_template,
    &[("context", &context), ("question", question), ("tone", tone_text)],
  );
  Ok(narrate_or_placeholder(state.narrator(), prompts, &instructions, &prompts.assistant_unavailable_text).await.text)
}

/// Summarize a learner's course progress. Missing data yields a fixed message, not an error.
#[instrument(level = "info", skip(state, email))]
pub async fn summarize_progress(state: &AppState, email: &str) -> Result<String, EngineError> {
  let email = email.trim();
  if email.is_empty() {
    return Err(EngineError::InvalidInput("email must not be empty".into()));
  }

  let prompts = &state.prompts;
  let rows = match state.progress.progress_for(email).await {
    Ok(rows) => rows,
    Err(e) => {
      warn!(target: "learnbuddy", error = %e, "Progress lookup failed");
      Vec::new()
    }
  };
  if rows.is_empty() {
    return Ok(fill_template(&prompts.progress_not_found_template, &[("email", email)]));
  }

  let progress_json = serde_json::to_string(&rows).unwrap_or_else(|_| "[]".into());
  let instructions = fill_template(&prompts.progress_template, &[("progress_json", &progress_json)]);
  Ok(narrate_or_placeholder(state.narrator(), prompts, &instructions, &prompts.assistant_unavailable_text).await.text)
}

fn validate_interest(interest: &str) -> Result<&str, EngineError> {
  let trimmed = interest.trim();
  if trimmed.is_empty() {
    return Err(EngineError::InvalidInput("interest category must not be empty".into()));
  }
  if trimmed.len() > 100 || trimmed.chars().any(char::is_control) {
    return Err(EngineError::InvalidInput("malformed interest category".into()));
  }
  Ok(trimmed)
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use std::sync::Arc;

  use crate::config::{Prompts, Tuning};
  use crate::course::tests::{android_catalog, FakeCatalog};
  use crate::domain::{AnswerKey, Difficulty, QuestionAnswer};
  use crate::narration::tests::FakeNarrator;
  use crate::sampler::tests::FakeBank;
  use crate::sources::{Narrator, ProgressSource};
  use crate::error::UpstreamError;
  use async_trait::async_trait;

  pub struct FakeProgress(pub Vec<serde_json::Value>);

  #[async_trait]
  impl ProgressSource for FakeProgress {
    async fn progress_for(&self, email: &str) -> Result<Vec<serde_json::Value>, UpstreamError> {
      Ok(self.0.iter().filter(|r| r["email"] == email).cloned().collect())
    }
  }

  pub fn state_with(bank: FakeBank, catalog: FakeCatalog, narrator: Option<FakeNarrator>) -> AppState {
    AppState {
      bank: Arc::new(bank),
      catalog: Arc::new(catalog),
      progress: Arc::new(FakeProgress(vec![serde_json::json!({
        "email": "sari@example.com", "name": "Sari", "completed_tutorials": 214, "active_tutorials": 214
      })])),
      narrator: narrator.map(|n| Arc::new(n) as Arc<dyn Narrator>),
      verifier: None,
      prompts: Prompts::default(),
      tuning: Tuning::default(),
    }
  }

  /// Fifteen questions (ids 1..=15) whose correct option is "right".
  pub fn fifteen_question_bank() -> FakeBank {
    let mut bank = FakeBank::with_pool_sizes(5, 5, 5);
    bank.keys = (1..=15).map(|id| AnswerKey { question_id: id, prompt: format!("Q{id}"), correct_option: "right".into() }).collect();
    bank
  }

  fn submission(interest: &str, correct: i64, ids: impl Iterator<Item = i64>) -> Submission {
    Submission {
      interest: interest.into(),
      declared_level: Difficulty::Beginner,
      answers: ids
        .map(|id| QuestionAnswer { question_id: id, selected_option: if id <= correct { "right" } else { "wrong" }.into() })
        .collect(),
    }
  }

  #[tokio::test]
  async fn android_nine_of_fifteen_is_intermediate() {
    let state = state_with(fifteen_question_bank(), android_catalog(), Some(FakeNarrator::default()));
    let out = submit_quiz(&state, &submission("Android Developer", 9, 1..=15)).await.unwrap();
    assert_eq!((out.grade.score, out.grade.total), (9, 15));
    assert_eq!(out.tier, ProficiencyTier::Intermediate);
    assert_eq!(out.tier.level_ordinal(), 3);
    assert_eq!(out.course.id, Some(71));
    assert_eq!(out.narration, "Great work!");
    assert!(!out.narration_degraded);
  }

  #[tokio::test]
  async fn unresolvable_answer_keys_are_not_found() {
    let state = state_with(fifteen_question_bank(), android_catalog(), Some(FakeNarrator::default()));
    let sub = submission("Android Developer", 0, 100..=104);
    assert!(matches!(submit_quiz(&state, &sub).await, Err(EngineError::NotFound(_))));
  }

  #[tokio::test]
  async fn zero_total_classifies_basic_and_uses_default_path() {
    // The service answers with a key, but for none of the submitted ids.
    struct MismatchedBank;
    #[async_trait]
    impl crate::sources::QuestionBank for MismatchedBank {
      async fn question_pool(&self, _: &str, _: Difficulty, _: usize) -> Result<Vec<crate::domain::QuizQuestion>, UpstreamError> {
        Ok(vec![])
      }
      async fn answer_keys(&self, _ids: &[i64]) -> Result<Vec<AnswerKey>, UpstreamError> {
        Ok(vec![AnswerKey { question_id: 424242, prompt: "stale".into(), correct_option: "a".into() }])
      }
    }

    let state = AppState { bank: Arc::new(MismatchedBank), ..state_with(FakeBank::default(), android_catalog(), Some(FakeNarrator::default())) };
    let out = submit_quiz(&state, &submission("Rust Developer", 0, 1..=3)).await.unwrap();
    assert_eq!((out.grade.score, out.grade.total), (0, 0));
    assert_eq!(out.tier, ProficiencyTier::Basic);
    assert_eq!(out.course.name, "Dasar Pemrograman");
    assert!(!out.narration.is_empty());
  }

  #[tokio::test]
  async fn narration_failure_keeps_structured_facts() {
    let narrator = FakeNarrator { fail: true, ..Default::default() };
    let state = state_with(fifteen_question_bank(), android_catalog(), Some(narrator));
    let out = submit_quiz(&state, &submission("Android Developer", 3, 1..=15)).await.unwrap();
    assert_eq!(out.grade.score, 3);
    assert_eq!(out.tier, ProficiencyTier::Basic);
    assert_eq!(out.course.id, Some(70));
    assert!(out.narration_degraded);
    assert_eq!(out.narration, Prompts::default().placeholder_text);
  }

  #[tokio::test]
  async fn empty_answers_are_invalid() {
    let state = state_with(fifteen_question_bank(), android_catalog(), None);
    let sub = submission("Android Developer", 0, std::iter::empty());
    assert!(matches!(submit_quiz(&state, &sub).await, Err(EngineError::InvalidInput(_))));
  }

  #[tokio::test]
  async fn blank_interest_is_invalid() {
    let state = state_with(fifteen_question_bank(), android_catalog(), None);
    assert!(matches!(get_quiz(&state, "   ").await, Err(EngineError::InvalidInput(_))));
  }

  #[tokio::test]
  async fn get_quiz_serves_fifteen() {
    let state = state_with(fifteen_question_bank(), android_catalog(), None);
    let quiz = get_quiz(&state, "Android Developer").await.unwrap();
    assert_eq!(quiz.questions.len(), 15);
  }

  #[tokio::test]
  async fn get_quiz_fails_whole_when_a_tier_fails() {
    let mut bank = fifteen_question_bank();
    bank.failing = Some(Difficulty::Advanced);
    let state = state_with(bank, android_catalog(), None);
    assert!(matches!(get_quiz(&state, "Android Developer").await, Err(EngineError::UpstreamUnavailable(_))));
  }

  #[tokio::test]
  async fn list_interests_filters_to_targets() {
    let mut catalog = android_catalog();
    catalog.interests = vec![
      InterestCategory { id: 7, name: "Android Developer".into() },
      InterestCategory { id: 99, name: "Cobol Wrangler".into() },
    ];
    let state = state_with(FakeBank::default(), catalog, None);
    let interests = list_interests(&state).await.unwrap();
    assert_eq!(interests, vec![InterestCategory { id: 7, name: "Android Developer".into() }]);
  }

  #[tokio::test]
  async fn list_interests_empty_is_not_found() {
    let state = state_with(FakeBank::default(), FakeCatalog::default(), None);
    assert!(matches!(list_interests(&state).await, Err(EngineError::NotFound(_))));
  }

  #[tokio::test]
  async fn list_interests_unreachable_is_unavailable() {
    let catalog = FakeCatalog { unreachable: true, ..Default::default() };
    let state = state_with(FakeBank::default(), catalog, None);
    assert!(matches!(list_interests(&state).await, Err(EngineError::UpstreamUnavailable(_))));
  }

  #[tokio::test]
  async fn answer_question_includes_tutorial_context() {
    let mut catalog = android_catalog();
    catalog.tutorials = vec!["Kotlin coroutines".into(), "Intro to Python".into()];
    let narrator = Arc::new(FakeNarrator::default());
    let state = AppState {
      narrator: Some(narrator.clone() as Arc<dyn Narrator>),
      ..state_with(FakeBank::default(), catalog, None)
    };
    let reply = answer_question(&state, "kotlin", Tone::Casual).await.unwrap();
    assert_eq!(reply, "Great work!");

    let sent = narrator.last_instructions.lock().unwrap().clone().unwrap();
    assert!(sent.contains("- Kotlin coroutines"));
    assert!(!sent.contains("Intro to Python"));
    assert!(sent.contains(&Prompts::default().ask_tone_casual));
  }

  #[tokio::test]
  async fn answer_question_rejects_blank() {
    let state = state_with(FakeBank::default(), FakeCatalog::default(), None);
    assert!(matches!(answer_question(&state, " ", Tone::default()).await, Err(EngineError::InvalidInput(_))));
  }

  #[tokio::test]
  async fn progress_not_found_skips_narration() {
    let narrator = Arc::new(FakeNarrator::default());
    let state = AppState {
      narrator: Some(narrator.clone() as Arc<dyn Narrator>),
      ..state_with(FakeBank::default(), FakeCatalog::default(), None)
    };
    let reply = summarize_progress(&state, "nobody@example.com").await.unwrap();
    assert!(reply.contains("nobody@example.com"));
    assert!(narrator.last_instructions.lock().unwrap().is_none());
  }

  #[tokio::test]
  async fn progress_found_is_narrated() {
    let narrator = Arc::new(FakeNarrator::default());
    let state = AppState {
      narrator: Some(narrator.clone() as Arc<dyn Narrator>),
      ..state_with(FakeBank::default(), FakeCatalog::default(), None)
    };
    let reply = summarize_progress(&state, "sari@example.com").await.unwrap();
    assert_eq!(reply, "Great work!");
    let sent = narrator.last_instructions.lock().unwrap().clone().unwrap();
    assert!(sent.contains("\"completed_tutorials\":214"));
  }

  #[tokio::test]
  async fn answer_question_falls_back_to_assistant_text() {
    let state = state_with(FakeBank::default(), android_catalog(), Some(FakeNarrator { fail: true, ..Default::default() }));
    let reply = answer_question(&state, "kotlin", Tone::default()).await.unwrap();
    let prompts = Prompts::default();
    assert_eq!(reply, prompts.assistant_unavailable_text);
    assert_ne!(reply, prompts.placeholder_text);
  }

  #[tokio::test]
  async fn progress_without_narrator_uses_assistant_text() {
    let state = state_with(FakeBank::default(), FakeCatalog::default(), None);
    let reply = summarize_progress(&state, "sari@example.com").await.unwrap();
    assert_eq!(reply, Prompts::default().assistant_unavailable_text);
  }
}
