//! Read-only collaborators the engine depends on.
//!
//! The engine only sees these traits. `rest::RestClient` implements the data traits over
//! the PostgREST services and `openai::ChatNarrator` implements `Narrator`; tests plug in
//! in-memory fakes.

use async_trait::async_trait;

use crate::domain::{AnswerKey, Course, Difficulty, InterestCategory, QuizQuestion};
use crate::error::{NarrationError, UpstreamError};

/// Question bank service.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Up to `limit` questions for one taxonomy label and difficulty. Never returns answer keys.
    async fn question_pool(
        &self,
        taxonomy_label: &str,
        difficulty: Difficulty,
        limit: usize,
    ) -> Result<Vec<QuizQuestion>, UpstreamError>;

    /// Canonical prompt + correct option for exactly the given ids (one query).
    async fn answer_keys(&self, ids: &[i64]) -> Result<Vec<AnswerKey>, UpstreamError>;
}

/// Learning-path catalog service.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Learning-path id whose display name matches exactly.
    async fn learning_path_id(&self, path_name: &str) -> Result<Option<i64>, UpstreamError>;

    /// A single course in `path_id` at `level_ordinal`.
    async fn course_at_level(&self, path_id: i64, level_ordinal: u8) -> Result<Option<Course>, UpstreamError>;

    /// Interest categories whose names are in `names`.
    async fn interests(&self, names: &[&str]) -> Result<Vec<InterestCategory>, UpstreamError>;

    /// Titles of tutorials matching a free-text search.
    async fn tutorial_titles(&self, search: &str, limit: usize) -> Result<Vec<String>, UpstreamError>;
}

/// Student progress records, keyed by email.
#[async_trait]
pub trait ProgressSource: Send + Sync {
    async fn progress_for(&self, email: &str) -> Result<Vec<serde_json::Value>, UpstreamError>;
}

/// Natural-language generation backend.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, system: &str, instructions: &str) -> Result<String, NarrationError>;
}
