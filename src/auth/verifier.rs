//! Identity verifiers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::{AuthConfig, AuthProvider};

/// The authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    pub id: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing or malformed Authorization header")]
    MissingToken,

    #[error("token rejected by identity provider")]
    InvalidToken,

    #[error("identity provider error: {0}")]
    Provider(String),

    #[error("identity verifier misconfigured: {0}")]
    Config(String),
}

/// Turns a bearer token into a [`Principal`].
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Build the verifier selected by `config.provider`.
pub fn build_verifier(config: &AuthConfig) -> Result<Arc<dyn IdentityVerifier>, AuthError> {
    match config.provider {
        AuthProvider::Static => {
            let tokens = config.static_tokens.clone();
            Ok(Arc::new(StaticTokenVerifier::new(tokens)))
        }
        AuthProvider::IdentityToolkit => {
            let api_key = config
                .api_key
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| AuthError::Config("auth.api_key is not set".to_string()))?;
            let verifier = IdentityToolkitVerifier::new(
                &config.lookup_url,
                api_key,
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(verifier))
        }
    }
}

/// Fixed token table. Development and tests only.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        self.tokens
            .get(token)
            .map(|id| Principal { id: id.clone() })
            .ok_or(AuthError::InvalidToken)
    }
}

/// Verifies ID tokens through the identity provider's account lookup API.
#[derive(Debug, Clone)]
pub struct IdentityToolkitVerifier {
    client: reqwest::Client,
    lookup_url: Url,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
}

impl IdentityToolkitVerifier {
    pub fn new(lookup_url: &str, api_key: &str, timeout: Duration) -> Result<Self, AuthError> {
        let mut lookup_url = Url::parse(lookup_url)
            .map_err(|e| AuthError::Config(format!("invalid lookup URL: {}", e)))?;
        lookup_url.query_pairs_mut().append_pair("key", api_key);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Config(e.to_string()))?;

        Ok(Self { client, lookup_url })
    }
}

#[async_trait]
impl IdentityVerifier for IdentityToolkitVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let response = self
            .client
            .post(self.lookup_url.clone())
            .json(&LookupRequest { id_token: token })
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            return Err(AuthError::Provider(format!("lookup returned HTTP {}", status)));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.without_url().to_string()))?;

        body.users
            .into_iter()
            .next()
            .map(|user| Principal { id: user.local_id })
            .ok_or(AuthError::InvalidToken)
    }
}
