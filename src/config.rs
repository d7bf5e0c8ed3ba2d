//! Process configuration: data-service credentials, narration and auth settings from the
//! environment, plus prompts and tuning from an optional TOML file (BUDDY_CONFIG_PATH).
//!
//! `Settings` is built once in `main` and handed to whoever needs a piece of it.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::error::ConfigError;

const DEFAULT_NARRATION_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_NARRATION_MODEL: &str = "gemini-2.5-flash";

/// Base URL + key for one PostgREST-style data service.
#[derive(Clone, Debug)]
pub struct ServiceEndpoint {
  pub base_url: String,
  pub api_key: String,
}

#[derive(Clone, Debug)]
pub struct NarrationSettings {
  pub api_key: Option<String>,
  pub base_url: String,
  pub model: String,
}

#[derive(Clone, Debug)]
pub struct AuthSettings {
  pub secret_key: Option<String>,
  pub algorithm: jsonwebtoken::Algorithm,
}

#[derive(Clone, Debug)]
pub struct Settings {
  pub catalog: ServiceEndpoint,
  pub question_bank: ServiceEndpoint,
  pub narration: NarrationSettings,
  pub auth: AuthSettings,
  pub agent: AgentConfig,
}

impl Settings {
  /// Build settings from the process environment.
  pub fn from_env() -> Result<Self, ConfigError> {
    let mut settings = Self::from_lookup(|k| std::env::var(k).ok())?;
    if let Some(cfg) = load_agent_config_from_env() {
      settings.agent = cfg;
    }
    Ok(settings)
  }

  /// Build settings from an arbitrary variable lookup (the environment in production).
  pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
    let required = |name: &'static str| -> Result<String, ConfigError> {
      get(name).filter(|v| !v.trim().is_empty()).ok_or(ConfigError::MissingVar(name))
    };

    let catalog = ServiceEndpoint {
      base_url: trim_base(&required("CATALOG_URL")?),
      api_key: required("CATALOG_KEY")?,
    };
    let question_bank = ServiceEndpoint {
      base_url: trim_base(&required("QUESTION_BANK_URL")?),
      api_key: required("QUESTION_BANK_KEY")?,
    };

    let narration = NarrationSettings {
      api_key: get("NARRATION_API_KEY").filter(|v| !v.is_empty()),
      base_url: trim_base(&get("NARRATION_BASE_URL").unwrap_or_else(|| DEFAULT_NARRATION_BASE_URL.into())),
      model: get("NARRATION_MODEL").unwrap_or_else(|| DEFAULT_NARRATION_MODEL.into()),
    };

    let algorithm = match get("JWT_ALGORITHM") {
      Some(name) => name.parse::<jsonwebtoken::Algorithm>().map_err(|e| ConfigError::InvalidValue {
        name: "JWT_ALGORITHM",
        message: e.to_string(),
      })?,
      None => jsonwebtoken::Algorithm::HS256,
    };
    let auth = AuthSettings { secret_key: get("JWT_SECRET_KEY").filter(|v| !v.is_empty()), algorithm };

    Ok(Self { catalog, question_bank, narration, auth, agent: AgentConfig::default() })
  }
}

fn trim_base(url: &str) -> String {
  url.trim().trim_end_matches('/').to_string()
}

/// Optional TOML-provided overrides.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub tuning: Tuning,
}

/// Time bounds and pool sizes used by the quiz pipeline.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Tuning {
  /// Per-request timeout applied to every data-service call.
  pub request_timeout_ms: u64,
  /// Ceiling for the whole three-tier quiz retrieval.
  pub quiz_fanout_timeout_ms: u64,
  /// Upper bound on rows fetched per difficulty tier. Never below the per-tier draw.
  pub pool_limit: usize,
}

impl Default for Tuning {
  fn default() -> Self {
    Self { request_timeout_ms: 10_000, quiz_fanout_timeout_ms: 15_000, pool_limit: 20 }
  }
}

impl Tuning {
  pub fn request_timeout(&self) -> Duration { Duration::from_millis(self.request_timeout_ms) }
  pub fn fanout_timeout(&self) -> Duration { Duration::from_millis(self.quiz_fanout_timeout_ms) }
}

/// Instruction templates handed to the narration service.
/// Override them in TOML to tune tone or language.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub narration_system: String,
  // Quiz feedback
  pub feedback_template: String,
  pub all_correct_text: String,
  // Question answering
  pub ask_template: String,
  pub ask_tone_to_the_point: String,
  pub ask_tone_casual: String,
  pub ask_no_context_text: String,
  // Progress summary
  pub progress_template: String,
  pub progress_not_found_template: String,
  // Used when narration is unavailable: quiz feedback, then the ask/progress assistant.
  pub placeholder_text: String,
  pub assistant_unavailable_text: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      narration_system: "You are Learning Buddy, a supportive coding mentor. Follow the task list exactly.".into(),
      feedback_template: "The learner just finished the '{category}' quiz.\n\
        - Score: {score} out of {total}\n\
        - Recommended level: {tier}\n\
        - Recommended course: {course}\n\n\
        Answer details (focus on the mistakes):\n\
        =========================================\n\
        {missed}\n\
        =========================================\n\n\
        Tasks:\n\
        1. Encourage the learner based on the score.\n\
        2. If there are wrong answers, pick {emphasis} of the most fundamental mistakes and briefly explain why the answer was wrong and what the right concept is. Do not cover every mistake.\n\
        3. Point the learner to the course '{course}' to strengthen that understanding.\n\
        4. Keep the reply short (at most {max_paragraphs} paragraphs).\n\
        5. List {skills} specific technical skills (keywords) the learner should master to fix the mistakes, ordered from basic to advanced.".into(),
      all_correct_text: "The learner answered every question correctly.".into(),
      ask_template: "You are an expert teaching assistant answering a student using the available course material.\n\n\
        {context}\n\n\
        Using the context above (if relevant) and your general knowledge, answer the student's question:\n\n\
        Question: \"{question}\"\n\n\
        Answer instructions: {tone}".into(),
      ask_tone_to_the_point: "Answer the technical question accurately, concisely and to the point.".into(),
      ask_tone_casual: "Answer in a relaxed, friendly and easy-to-follow tone, as if explaining to a friend.".into(),
      ask_no_context_text: "No matching course material was found.".into(),
      progress_template: "You are a friendly, supportive mentor.\n\
        Here is a student's learning progress as JSON (there may be several courses):\n\
        {progress_json}\n\n\
        Tasks:\n\
        1. 'name' is the student's name.\n\
        2. 'completed_tutorials' is the number finished and 'active_tutorials' the total number of modules.\n\
        3. Compute each course's progress as completed_tutorials / active_tutorials * 100.\n\
        4. Give a friendly, motivating summary covering every course.\n\
        5. If 'is_graduated' = 1, congratulate them; if 'exam_score' is present and not null, mention it.\n\
        6. Answer as natural paragraphs.".into(),
      progress_not_found_template: "Sorry, I could not find any progress data for {email}.".into(),
      placeholder_text: "Sorry, the feedback service is unavailable right now. Your results are shown below.".into(),
      assistant_unavailable_text: "Sorry, the assistant is unavailable right now. Please try again in a moment.".into(),
    }
  }
}

/// Attempt to load `AgentConfig` from BUDDY_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("BUDDY_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AgentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "learnbuddy", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "learnbuddy", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "learnbuddy", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
