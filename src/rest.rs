//! Minimal PostgREST client used for both data services (catalog and question bank).
//!
//! Every call goes through `fetch_rows`, which renders a typed `RowQuery`, attaches the
//! service credentials and checks the status before decoding. Calls are instrumented with
//! the table and row counts (not contents).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::ServiceEndpoint;
use crate::domain::{AnswerKey, Course, Difficulty, InterestCategory, QuizQuestion};
use crate::error::UpstreamError;
use crate::query::RowQuery;
use crate::sources::{Catalog, ProgressSource, QuestionBank};

const QUESTIONS_TABLE: &str = "Tech Questions";
const PROGRESS_TABLE: &str = "Student Progress";
const LEARNING_PATHS_TABLE: &str = "learning_paths";
const COURSES_TABLE: &str = "courses";
const TUTORIALS_TABLE: &str = "tutorials";

#[derive(Clone)]
pub struct RestClient {
  client: reqwest::Client,
  base_url: String,
  api_key: String,
  /// Short service name used in logs ("catalog", "question_bank").
  service: &'static str,
}

impl RestClient {
  pub fn new(service: &'static str, endpoint: &ServiceEndpoint, timeout: Duration) -> Result<Self, UpstreamError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url: endpoint.base_url.clone(), api_key: endpoint.api_key.clone(), service })
  }

  fn table_url(&self, table: &str) -> Result<Url, UpstreamError> {
    let mut url = Url::parse(&self.base_url).map_err(|e| UpstreamError::Parse(format!("base url: {e}")))?;
    url
      .path_segments_mut()
      .map_err(|_| UpstreamError::Parse("base url cannot carry a path".into()))?
      .pop_if_empty()
      .push(table);
    Ok(url)
  }

  #[instrument(level = "debug", skip(self, query), fields(service = self.service, table = %query.table))]
  async fn fetch_rows<T: DeserializeOwned>(&self, query: &RowQuery) -> Result<Vec<T>, UpstreamError> {
    let url = self.table_url(&query.table)?;
    let res = self
      .client
      .get(url)
      .header(USER_AGENT, "learnbuddy-backend/0.1")
      .header("apikey", &self.api_key)
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .query(&query.to_params())
      .send()
      .await?;
    let res = check_response(res).await?;
    let rows: Vec<T> = res.json().await?;
    debug!(target: "learnbuddy", service = self.service, table = %query.table, rows = rows.len(), "Rows fetched");
    Ok(rows)
  }
}

/// Map non-success statuses to `UpstreamError::Api`, keeping the body for diagnostics.
pub async fn check_response(res: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
  let status = res.status();
  if status.is_success() {
    return Ok(res);
  }
  let body = res.text().await.unwrap_or_default();
  Err(UpstreamError::Api { status: status.as_u16(), message: crate::util::trunc_for_log(&body, 300) })
}

// --- Row DTOs ---

#[derive(Deserialize)]
struct QuestionRow {
  id: i64,
  question_desc: String,
  option_1: String,
  option_2: String,
  option_3: String,
  option_4: String,
}

#[derive(Deserialize)]
struct AnswerKeyRow {
  id: i64,
  question_desc: String,
  correct_answer: String,
}

#[derive(Deserialize)]
struct PathRow {
  learning_path_id: i64,
  #[serde(default)]
  learning_path_name: Option<String>,
}

#[derive(Deserialize)]
struct CourseRow {
  #[serde(default)]
  course_id: Option<i64>,
  #[serde(default)]
  course_name: Option<String>,
}

#[derive(Deserialize)]
struct TutorialRow {
  tutorial_title: String,
}

#[async_trait]
impl QuestionBank for RestClient {
  async fn question_pool(
    &self,
    taxonomy_label: &str,
    difficulty: Difficulty,
    limit: usize,
  ) -> Result<Vec<QuizQuestion>, UpstreamError> {
    let query = RowQuery::table(QUESTIONS_TABLE)
      .select(&["id", "question_desc", "option_1", "option_2", "option_3", "option_4"])
      .eq("tech_category", taxonomy_label)
      .eq("difficulty", difficulty.as_str())
      .limit(limit);
    let rows: Vec<QuestionRow> = self.fetch_rows(&query).await?;
    Ok(
      rows
        .into_iter()
        .map(|r| QuizQuestion {
          id: r.id,
          prompt: r.question_desc,
          options: [r.option_1, r.option_2, r.option_3, r.option_4],
          difficulty,
          taxonomy_label: taxonomy_label.to_string(),
        })
        .collect(),
    )
  }

  async fn answer_keys(&self, ids: &[i64]) -> Result<Vec<AnswerKey>, UpstreamError> {
    let query = RowQuery::table(QUESTIONS_TABLE)
      .select(&["id", "question_desc", "correct_answer"])
      .any_of("id", ids.iter().copied());
    let rows: Vec<AnswerKeyRow> = self.fetch_rows(&query).await?;
    Ok(
      rows
        .into_iter()
        .map(|r| AnswerKey { question_id: r.id, prompt: r.question_desc, correct_option: r.correct_answer })
        .collect(),
    )
  }
}

#[async_trait]
impl Catalog for RestClient {
  async fn learning_path_id(&self, path_name: &str) -> Result<Option<i64>, UpstreamError> {
    let query = RowQuery::table(LEARNING_PATHS_TABLE)
      .select(&["learning_path_id"])
      .eq("learning_path_name", path_name)
      .limit(1);
    let rows: Vec<PathRow> = self.fetch_rows(&query).await?;
    Ok(rows.first().map(|r| r.learning_path_id))
  }

  async fn course_at_level(&self, path_id: i64, level_ordinal: u8) -> Result<Option<Course>, UpstreamError> {
    let query = RowQuery::table(COURSES_TABLE)
      .select(&["course_id", "course_name"])
      .eq("learning_path_id", path_id)
      .eq("course_level_str", i64::from(level_ordinal))
      .limit(1);
    let rows: Vec<CourseRow> = self.fetch_rows(&query).await?;
    // A row without a name is not a usable recommendation.
    Ok(rows.into_iter().next().and_then(|r| r.course_name.map(|name| Course { id: r.course_id, name })))
  }

  async fn interests(&self, names: &[&str]) -> Result<Vec<InterestCategory>, UpstreamError> {
    let query = RowQuery::table(LEARNING_PATHS_TABLE)
      .select(&["learning_path_id", "learning_path_name"])
      .any_of("learning_path_name", names.iter().copied());
    let rows: Vec<PathRow> = self.fetch_rows(&query).await?;
    Ok(
      rows
        .into_iter()
        .filter_map(|r| r.learning_path_name.map(|name| InterestCategory { id: r.learning_path_id, name }))
        .collect(),
    )
  }

  async fn tutorial_titles(&self, search: &str, limit: usize) -> Result<Vec<String>, UpstreamError> {
    let query = RowQuery::table(TUTORIALS_TABLE)
      .select(&["tutorial_title"])
      .ilike("tutorial_title", &search_pattern(search))
      .limit(limit);
    let rows: Vec<TutorialRow> = self.fetch_rows(&query).await?;
    Ok(rows.into_iter().map(|r| r.tutorial_title).collect())
  }
}

#[async_trait]
impl ProgressSource for RestClient {
  async fn progress_for(&self, email: &str) -> Result<Vec<serde_json::Value>, UpstreamError> {
    let query = RowQuery::table(PROGRESS_TABLE).eq("email", email);
    self.fetch_rows(&query).await
  }
}

/// Contains-match pattern where every gap between words is a wildcard.
fn search_pattern(search: &str) -> String {
  let words: Vec<&str> = search.split_whitespace().collect();
  format!("*{}*", words.join("*"))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
    reqwest::Response::from(::http::Response::builder().status(status).body(body).unwrap())
  }

  fn client(base: &str) -> RestClient {
    let endpoint = ServiceEndpoint { base_url: base.into(), api_key: "k".into() };
    RestClient::new("test", &endpoint, Duration::from_secs(1)).unwrap()
  }

  #[tokio::test]
  async fn check_response_passes_success() {
    assert!(check_response(mock_response(200, "[]")).await.is_ok());
  }

  #[tokio::test]
  async fn check_response_maps_server_error() {
    let err = check_response(mock_response(503, "down")).await.unwrap_err();
    match err {
      UpstreamError::Api { status, message } => {
        assert_eq!(status, 503);
        assert_eq!(message, "down");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn table_url_encodes_spaces() {
    let url = client("https://bank.example/rest/v1").table_url(QUESTIONS_TABLE).unwrap();
    assert_eq!(url.as_str(), "https://bank.example/rest/v1/Tech%20Questions");
  }

  #[test]
  fn search_pattern_widens_gaps() {
    assert_eq!(search_pattern("android  view model"), "*android*view*model*");
  }
}
