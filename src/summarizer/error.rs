//! Summarization error taxonomy.

use std::time::Duration;

use thiserror::Error;

use crate::resilience::{AttemptTimeout, Disposition, Retryable};

/// Every way a summarize call can end without a summary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummarizeError {
    /// No endpoint credential configured. Detected before any network call.
    #[error("summarizer API key is not configured")]
    NotConfigured,

    /// Source text was empty or whitespace only.
    #[error("input text is empty")]
    EmptyInput,

    /// Upstream rejected the credential (HTTP 401).
    #[error("invalid summarizer API key: {message}")]
    AuthFailed { message: String },

    /// Upstream kept answering HTTP 429 until attempts ran out.
    #[error("summarizer rate limit exceeded: {message}")]
    RateLimited { message: String },

    /// Success status, but no generated text where it should be.
    #[error("malformed summarizer response: {0}")]
    Malformed(String),

    #[error("summarizer request timed out after {0:?}")]
    Timeout(Duration),

    /// Network-level failure before a response arrived.
    #[error("summarizer unreachable: {0}")]
    Unreachable(String),

    /// Any other upstream failure.
    #[error("summarizer request failed: {message}")]
    Unknown { status: Option<u16>, message: String },
}

/// Stable label for each [`SummarizeError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummarizeErrorKind {
    NotConfigured,
    EmptyInput,
    AuthFailed,
    RateLimited,
    Malformed,
    Timeout,
    Unreachable,
    Unknown,
}

impl SummarizeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummarizeErrorKind::NotConfigured => "not_configured",
            SummarizeErrorKind::EmptyInput => "empty_input",
            SummarizeErrorKind::AuthFailed => "auth_failed",
            SummarizeErrorKind::RateLimited => "rate_limited",
            SummarizeErrorKind::Malformed => "malformed",
            SummarizeErrorKind::Timeout => "timeout",
            SummarizeErrorKind::Unreachable => "unreachable",
            SummarizeErrorKind::Unknown => "unknown",
        }
    }
}

impl SummarizeError {
    pub fn kind(&self) -> SummarizeErrorKind {
        match self {
            SummarizeError::NotConfigured => SummarizeErrorKind::NotConfigured,
            SummarizeError::EmptyInput => SummarizeErrorKind::EmptyInput,
            SummarizeError::AuthFailed { .. } => SummarizeErrorKind::AuthFailed,
            SummarizeError::RateLimited { .. } => SummarizeErrorKind::RateLimited,
            SummarizeError::Malformed(_) => SummarizeErrorKind::Malformed,
            SummarizeError::Timeout(_) => SummarizeErrorKind::Timeout,
            SummarizeError::Unreachable(_) => SummarizeErrorKind::Unreachable,
            SummarizeError::Unknown { .. } => SummarizeErrorKind::Unknown,
        }
    }
}

impl Retryable for SummarizeError {
    fn disposition(&self) -> Disposition {
        match self {
            SummarizeError::RateLimited { .. } => Disposition::RetryWithBackoff,
            SummarizeError::Timeout(_)
            | SummarizeError::Unreachable(_)
            | SummarizeError::Unknown { .. } => Disposition::RetryImmediately,
            SummarizeError::NotConfigured
            | SummarizeError::EmptyInput
            | SummarizeError::AuthFailed { .. }
            | SummarizeError::Malformed(_) => Disposition::Terminal,
        }
    }
}

impl From<AttemptTimeout> for SummarizeError {
    fn from(timeout: AttemptTimeout) -> Self {
        SummarizeError::Timeout(timeout.after)
    }
}
