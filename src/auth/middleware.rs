//! Bearer-token authentication middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::verifier::{AuthError, IdentityVerifier};

/// Extract the token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Rejects the request with 401 unless the bearer token verifies; otherwise
/// attaches the [`Principal`](crate::auth::Principal) as a request extension.
pub async fn require_principal(
    State(verifier): State<Arc<dyn IdentityVerifier>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_owned);

    let result = match token {
        Some(token) => verifier.verify(&token).await,
        None => Err(AuthError::MissingToken),
    };

    match result {
        Ok(principal) => {
            tracing::debug!(principal = %principal.id, "Request authenticated");
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => {
            match &e {
                AuthError::Provider(_) | AuthError::Config(_) => {
                    tracing::error!(error = %e, "Token verification failed")
                }
                _ => tracing::debug!(error = %e, "Unauthenticated request"),
            }
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
}
