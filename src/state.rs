//! Application state: data-service clients, narration client, prompts and tuning.
//!
//! There is no per-user or cross-request data here. Every request builds its own working
//! set (pools, answer-key maps) and drops it when the response is sent.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::auth::TokenVerifier;
use crate::config::{Prompts, Settings, Tuning};
use crate::error::UpstreamError;
use crate::openai::ChatNarrator;
use crate::rest::RestClient;
use crate::sources::{Catalog, Narrator, ProgressSource, QuestionBank};

#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<dyn QuestionBank>,
    pub catalog: Arc<dyn Catalog>,
    pub progress: Arc<dyn ProgressSource>,
    pub narrator: Option<Arc<dyn Narrator>>,
    pub verifier: Option<TokenVerifier>,
    pub prompts: Prompts,
    pub tuning: Tuning,
}

impl AppState {
    /// Build clients from settings. Progress records live alongside the question bank.
    #[instrument(level = "info", skip_all)]
    pub fn from_settings(settings: &Settings) -> Result<Self, UpstreamError> {
        let tuning = settings.agent.tuning.clone();
        let timeout = tuning.request_timeout();

        let bank_client = Arc::new(RestClient::new("question_bank", &settings.question_bank, timeout)?);
        let catalog_client = Arc::new(RestClient::new("catalog", &settings.catalog, timeout)?);
        info!(target: "learnbuddy", catalog = %settings.catalog.base_url, question_bank = %settings.question_bank.base_url, ?timeout, "Data services configured");

        let narrator = ChatNarrator::from_settings(&settings.narration);
        if let Some(n) = &narrator {
            info!(target: "learnbuddy", base_url = %n.base_url, model = %n.model, "Narration enabled.");
        } else {
            info!(target: "learnbuddy", "Narration disabled (no NARRATION_API_KEY). Feedback uses the placeholder.");
        }

        let verifier = TokenVerifier::from_settings(&settings.auth);
        if verifier.is_none() {
            info!(target: "learnbuddy", "JWT_SECRET_KEY not set; token-scoped progress is disabled.");
        }

        Ok(Self {
            bank: bank_client.clone(),
            catalog: catalog_client,
            progress: bank_client,
            narrator: narrator.map(|n| Arc::new(n) as Arc<dyn Narrator>),
            verifier,
            prompts: settings.agent.prompts.clone(),
            tuning,
        })
    }

    pub fn narrator(&self) -> Option<&dyn Narrator> {
        self.narrator.as_deref()
    }
}
