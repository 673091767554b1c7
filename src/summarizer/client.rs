//! Summarization client.
//!
//! # Responsibilities
//! - Reject calls that cannot succeed (no credential, blank text) before any I/O
//! - Build the generate-content request and send it through the executor
//! - Classify each upstream answer into a summary or a [`SummarizeError`]

use std::sync::Arc;
use std::time::{Duration, Instant};

use url::Url;

use crate::config::SummarizerConfig;
use crate::observability::metrics;
use crate::resilience::{ResilientCallExecutor, RetryPolicy};
use crate::summarizer::error::SummarizeError;
use crate::summarizer::payload::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use crate::summarizer::transport::{
    GenerativeTransport, ReqwestTransport, TransportError, TransportResponse,
};

/// Longest slice of a raw upstream body kept as a diagnostic.
const MAX_DIAGNOSTIC_LEN: usize = 200;

/// Summarizes text through the configured generative endpoint.
#[derive(Clone)]
pub struct SummarizerClient {
    config: SummarizerConfig,
    transport: Arc<dyn GenerativeTransport>,
    executor: ResilientCallExecutor,
}

impl SummarizerClient {
    pub fn new(config: SummarizerConfig, transport: Arc<dyn GenerativeTransport>) -> Self {
        let executor = ResilientCallExecutor::new(RetryPolicy::from(&config));
        Self {
            config,
            transport,
            executor,
        }
    }

    /// Client backed by [`ReqwestTransport`].
    pub fn from_config(config: SummarizerConfig) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref().filter(|key| !key.is_empty())
    }

    /// Summarize `text`, retrying transient upstream failures.
    pub async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let api_key = self.api_key().ok_or_else(|| {
            tracing::error!("Summarizer API key is not configured");
            SummarizeError::NotConfigured
        })?;

        if text.trim().is_empty() {
            return Err(SummarizeError::EmptyInput);
        }

        let url = self.request_url(api_key)?;
        let request = GenerateContentRequest::summary(text, &self.config);
        let start = Instant::now();

        let url = &url;
        let request = &request;
        let result = self
            .executor
            .execute(move |attempt| self.attempt(attempt, url, request))
            .await;

        metrics::record_summarize_outcome(result.as_ref().err().map(|e| e.kind()), start);
        result
    }

    fn request_url(&self, api_key: &str) -> Result<Url, SummarizeError> {
        let mut url = Url::parse(&self.config.endpoint).map_err(|e| SummarizeError::Unknown {
            status: None,
            message: format!("invalid summarizer endpoint: {}", e),
        })?;
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }

    async fn attempt(
        &self,
        attempt: u32,
        url: &Url,
        request: &GenerateContentRequest,
    ) -> Result<String, SummarizeError> {
        metrics::record_summarize_attempt();
        tracing::debug!(
            attempt = attempt + 1,
            text_len = request.contents[0].parts[0].text.len(),
            "Sending summarize request"
        );

        let response = self
            .transport
            .post_json(url, request)
            .await
            .map_err(|e| match e {
                TransportError::Timeout => {
                    SummarizeError::Timeout(Duration::from_secs(self.config.timeout_secs))
                }
                TransportError::Network(message) => SummarizeError::Unreachable(message),
            })?;

        classify_response(response)
    }
}

impl std::fmt::Debug for SummarizerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerClient")
            .field("endpoint", &self.config.endpoint)
            .field("configured", &self.is_configured())
            .field("max_retries", &self.config.max_retries)
            .finish()
    }
}

fn classify_response(response: TransportResponse) -> Result<String, SummarizeError> {
    match response.status {
        200..=299 => {
            let payload: GenerateContentResponse = serde_json::from_str(&response.body)
                .map_err(|e| SummarizeError::Malformed(format!("invalid JSON: {}", e)))?;
            let summary = payload
                .first_text()
                .ok_or_else(|| {
                    SummarizeError::Malformed("no generated text in response".to_string())
                })?
                .trim()
                .to_string();
            tracing::debug!(summary_len = summary.len(), "Summary generated");
            Ok(summary)
        }
        401 => Err(SummarizeError::AuthFailed {
            message: upstream_message(&response),
        }),
        429 => Err(SummarizeError::RateLimited {
            message: upstream_message(&response),
        }),
        status => Err(SummarizeError::Unknown {
            status: Some(status),
            message: upstream_message(&response),
        }),
    }
}

/// Best diagnostic available: the error envelope's message, else a prefix of
/// the raw body, else the status code.
fn upstream_message(response: &TransportResponse) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&response.body) {
        if let Some(message) = envelope.error.message.filter(|m| !m.is_empty()) {
            return message;
        }
    }

    let body = response.body.trim();
    if body.is_empty() {
        return format!("upstream returned HTTP {}", response.status);
    }
    body.chars().take(MAX_DIAGNOSTIC_LEN).collect()
}
