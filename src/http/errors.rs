//! API error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::notes::FieldError;
use crate::store::StoreError;
use crate::summarizer::SummarizeError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Note not found")]
    NotFound,

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("invalid request body: {0}")]
    BadBody(String),

    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,

    /// `context` is the user-facing message; the source is only logged.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("summarization failed: {error}")]
    Summarize {
        error: SummarizeError,
        expose_details: bool,
    },
}

impl ApiError {
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Store { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::BadBody(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Summarize { error, .. } => summarize_status(error),
        }
    }
}

fn summarize_status(error: &SummarizeError) -> StatusCode {
    match error {
        SummarizeError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
        SummarizeError::EmptyInput => StatusCode::BAD_REQUEST,
        SummarizeError::AuthFailed { .. } => StatusCode::UNAUTHORIZED,
        SummarizeError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        SummarizeError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        SummarizeError::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
        SummarizeError::Malformed(_) | SummarizeError::Unknown { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn summarize_message(error: &SummarizeError) -> &'static str {
    match error {
        SummarizeError::NotConfigured => "Summarization service is not properly configured",
        SummarizeError::EmptyInput => "Note content is empty",
        SummarizeError::AuthFailed { .. } => "Summarization service authentication failed",
        SummarizeError::RateLimited { .. } => {
            "Too many summarization requests. Please try again later."
        }
        SummarizeError::Timeout(_) => "Summarization request timed out. Please try again.",
        SummarizeError::Unreachable(_) => {
            "Unable to reach summarization service. Please try again later."
        }
        SummarizeError::Malformed(_) | SummarizeError::Unknown { .. } => {
            "Failed to summarize note. Please try again later."
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::NotFound => json!({ "error": "Note not found" }),
            ApiError::Validation(errors) => json!({ "errors": errors }),
            ApiError::PayloadTooLarge => json!({ "error": "Payload too large" }),
            ApiError::BadBody(message) => json!({
                "errors": [{ "field": "body", "message": message }]
            }),
            ApiError::Store { context, source } => {
                tracing::error!(error = %source, "{}", context);
                json!({ "error": context })
            }
            ApiError::Summarize { error, expose_details } => {
                let mut body = json!({ "error": summarize_message(error) });
                if *expose_details {
                    body["details"] = json!(error.to_string());
                }
                body
            }
        };

        (status, Json(body)).into_response()
    }
}
