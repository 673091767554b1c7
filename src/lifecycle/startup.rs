//! Startup orchestration.
//!
//! # Responsibilities
//! - Build every subsystem from a validated config, in dependency order
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A missing summarizer credential is not a startup error; it surfaces per
//!   request so the rest of the API stays usable

use std::sync::Arc;

use thiserror::Error;

use crate::auth::{build_verifier, AuthError};
use crate::config::NotesConfig;
use crate::http::{AppState, HttpServer};
use crate::store::{MemoryNoteStore, NoteStore, StoreError};
use crate::summarizer::SummarizerClient;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open note store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to set up authentication: {0}")]
    Auth(#[from] AuthError),

    #[error("failed to build summarizer HTTP client: {0}")]
    Summarizer(#[from] reqwest::Error),
}

/// Build the HTTP server and its collaborators from `config`.
pub fn build_server(config: NotesConfig) -> Result<HttpServer, StartupError> {
    let store: Arc<dyn NoteStore> = match &config.storage.persistence_path {
        Some(path) => Arc::new(MemoryNoteStore::load_from_file(path)?),
        None => {
            tracing::warn!("No storage.persistence_path set; notes will not survive a restart");
            Arc::new(MemoryNoteStore::new(None))
        }
    };

    let verifier = build_verifier(&config.auth)?;

    let summarizer = SummarizerClient::from_config(config.summarizer.clone())?;
    if !summarizer.is_configured() {
        tracing::warn!("Summarizer API key is not configured; summarize requests will fail");
    }

    tracing::info!(
        auth_provider = ?config.auth.provider,
        environment = ?config.environment,
        summarizer_max_retries = config.summarizer.max_retries,
        "Subsystems initialized"
    );

    let state = AppState {
        store,
        summarizer,
        environment: config.environment,
    };
    Ok(HttpServer::new(config, state, verifier))
}
