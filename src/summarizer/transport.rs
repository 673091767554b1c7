//! HTTP transport seam for the summarizer.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::summarizer::payload::GenerateContentRequest;

/// Raw upstream answer; classification happens in the client.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),
}

/// Sends one generate-content request. Implementations must not retry.
#[async_trait]
pub trait GenerativeTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &Url,
        body: &GenerateContentRequest,
    ) -> Result<TransportResponse, TransportError>;
}

/// Production transport over a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// `timeout` bounds a whole request; the executor enforces its own deadline too.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(concat!("notes-api/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl GenerativeTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &Url,
        body: &GenerateContentRequest,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(TransportResponse { status, body })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        // Strip the URL: it carries the credential as a query parameter.
        TransportError::Network(e.without_url().to_string())
    }
}
