//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; failures (malformed input included) map to status codes through `EngineError`.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::auth::AuthenticatedEmail;
use crate::domain::Submission;
use crate::error::EngineError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

use super::extract::{ApiJson, ApiQuery};

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_interests(State(state): State<Arc<AppState>>) -> Result<Json<Vec<InterestOut>>, EngineError> {
  let interests = list_interests(&state).await?;
  info!(target: "recommend", count = interests.len(), "HTTP interests served");
  Ok(Json(interests.into_iter().map(InterestOut::from).collect()))
}

#[instrument(level = "info", skip(state), fields(interest = %q.interest))]
pub async fn http_get_quiz(
  State(state): State<Arc<AppState>>,
  ApiQuery(q): ApiQuery<QuizQuery>,
) -> Result<Json<Vec<QuizQuestionOut>>, EngineError> {
  let quiz = get_quiz(&state, &q.interest).await?;
  info!(target: "quiz", interest = %q.interest, served = quiz.questions.len(), "HTTP quiz served");
  Ok(Json(quiz.questions.into_iter().map(to_out).collect()))
}

#[instrument(level = "info", skip(state, body), fields(interest = %body.interest, answers = body.answers.len()))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  ApiJson(body): ApiJson<SubmitIn>,
) -> Result<Json<SubmitOut>, EngineError> {
  let submission = Submission::from(body);
  let outcome = submit_quiz(&state, &submission).await?;
  info!(target: "recommend", score = outcome.grade.score, total = outcome.grade.total, tier = outcome.tier.label(), "HTTP submission evaluated");
  Ok(Json(SubmitOut::from(outcome)))
}

#[instrument(level = "info", skip(state, body), fields(question_len = body.question.len(), preset = ?body.preset))]
pub async fn http_post_ask(
  State(state): State<Arc<AppState>>,
  ApiJson(body): ApiJson<AskIn>,
) -> Result<Json<BotOut>, EngineError> {
  let bot_response = answer_question(&state, &body.question, body.preset).await?;
  Ok(Json(BotOut { bot_response }))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_progress(
  State(state): State<Arc<AppState>>,
  ApiJson(body): ApiJson<ProgressIn>,
) -> Result<Json<BotOut>, EngineError> {
  let bot_response = summarize_progress(&state, &body.email).await?;
  Ok(Json(BotOut { bot_response }))
}

#[instrument(level = "info", skip(state, email))]
pub async fn http_get_my_progress(
  State(state): State<Arc<AppState>>,
  AuthenticatedEmail(email): AuthenticatedEmail,
) -> Result<Json<BotOut>, EngineError> {
  let bot_response = summarize_progress(&state, &email).await?;
  Ok(Json(BotOut { bot_response }))
}
