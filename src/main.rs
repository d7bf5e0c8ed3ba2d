//! Learning Buddy · Quiz Assessment & Recommendation Backend
//!
//! - Axum HTTP API: interests, leveled quiz, submission grading + course recommendation
//! - Two PostgREST data services (catalog, question bank) queried read-only
//! - Optional narration via an OpenAI-compatible chat endpoint
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   CATALOG_URL / CATALOG_KEY              : catalog data service (required)
//!   QUESTION_BANK_URL / QUESTION_BANK_KEY  : question bank data service (required)
//!   NARRATION_API_KEY   : enables narration if present
//!   NARRATION_BASE_URL  : default Gemini's OpenAI-compatible endpoint
//!   NARRATION_MODEL     : default "gemini-2.5-flash"
//!   JWT_SECRET_KEY      : enables token-scoped progress (JWT_ALGORITHM, default HS256)
//!   BUDDY_CONFIG_PATH   : path to TOML config (prompts + tuning)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod auth;
mod category;
mod config;
mod course;
mod domain;
mod error;
mod grader;
mod logic;
mod narration;
mod openai;
mod proficiency;
mod protocol;
mod query;
mod rest;
mod routes;
mod sampler;
mod sources;
mod state;
mod telemetry;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Settings;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let settings = Settings::from_env().map_err(|e| {
    error!(target: "learnbuddy", error = %e, "Invalid configuration");
    e
  })?;

  // Data-service clients, narration client, prompts and tuning.
  let state = Arc::new(AppState::from_settings(&settings)?);

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "learnbuddy", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!(target: "learnbuddy", error = %e, "Failed to listen for shutdown signal");
    return;
  }
  info!(target: "learnbuddy", "Shutdown signal received");
}
