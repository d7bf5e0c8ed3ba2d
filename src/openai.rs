//! Minimal OpenAI-compatible chat client used as the narration backend.
//!
//! We only call chat.completions and request plain text. The default endpoint is Gemini's
//! OpenAI-compatible surface, but any compatible base URL works.
//! Calls are instrumented and log model names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::NarrationSettings;
use crate::error::NarrationError;
use crate::sources::Narrator;

const NARRATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ChatNarrator {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl ChatNarrator {
  /// Construct the client if an API key is configured; otherwise return None.
  pub fn from_settings(settings: &NarrationSettings) -> Option<Self> {
    let api_key = settings.api_key.clone()?;
    let client = reqwest::Client::builder().timeout(NARRATION_TIMEOUT).build().ok()?;
    Some(Self { client, api_key, base_url: settings.base_url.clone(), model: settings.model.clone() })
  }

  /// Plain-text chat completion.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_plain(&self, system: &str, user: &str, temperature: f32) -> Result<String, NarrationError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "learnbuddy-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_api_error(&body).unwrap_or(body);
      return Err(NarrationError::Api { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Narration usage");
    }
    let text = first_choice_text(body);
    info!(elapsed = ?start.elapsed(), response_len = text.len(), "Narration received");
    if text.is_empty() {
      return Err(NarrationError::Empty);
    }
    Ok(text)
  }
}

#[async_trait]
impl Narrator for ChatNarrator {
  async fn narrate(&self, system: &str, instructions: &str) -> Result<String, NarrationError> {
    self.chat_plain(system, instructions, 0.7).await
  }
}

fn first_choice_text(body: ChatCompletionResponse) -> String {
  body.choices.into_iter().next()
    .and_then(|c| c.message.content)
    .unwrap_or_default().trim().to_string()
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI-style error body.
/// Gemini wraps the same shape in a one-element array.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  if let Ok(w) = serde_json::from_str::<EWrap>(body) {
    return Some(w.error.message);
  }
  serde_json::from_str::<Vec<EWrap>>(body).ok()?.into_iter().next().map(|w| w.error.message)
}
