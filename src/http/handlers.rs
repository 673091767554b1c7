//! Note route handlers.
//!
//! Every handler receives the [`Principal`] placed by the auth middleware and
//! passes its id to the store; nothing here reads another owner's notes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::Principal;
use crate::http::errors::ApiError;
use crate::http::server::AppState;
use crate::notes::{Note, NoteId, NoteInput};

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Ids that do not parse cannot exist, so they are plain 404s.
fn parse_id(raw: &str) -> Result<NoteId, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

fn parse_body(body: Result<Json<NoteInput>, JsonRejection>) -> Result<NoteInput, ApiError> {
    body.map(|Json(input)| input).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadBody(rejection.body_text())
        }
    })
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn list_notes(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = state
        .store
        .list(&principal.id)
        .await
        .map_err(ApiError::store("Failed to fetch notes"))?;
    Ok(Json(notes))
}

pub async fn get_note(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_id(&id)?;
    state
        .store
        .get(&principal.id, id)
        .await
        .map_err(ApiError::store("Failed to fetch note"))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn create_note(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<NoteInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = parse_body(body)?.validate().map_err(ApiError::Validation)?;
    let note = state
        .store
        .insert(&principal.id, draft)
        .await
        .map_err(ApiError::store("Failed to create note"))?;

    tracing::info!(principal = %principal.id, note_id = %note.id, "Note created");
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update_note(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<NoteInput>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let draft = parse_body(body)?.validate().map_err(ApiError::Validation)?;
    let id = parse_id(&id)?;
    state
        .store
        .replace(&principal.id, id, draft)
        .await
        .map_err(ApiError::store("Failed to update note"))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn delete_note(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    state
        .store
        .delete(&principal.id, id)
        .await
        .map_err(ApiError::store("Failed to delete note"))?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(principal = %principal.id, note_id = %id, "Note deleted");
    Ok(Json(json!({ "message": "Note deleted successfully" })))
}

pub async fn summarize_note(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let id = parse_id(&id)?;
    let note = state
        .store
        .get(&principal.id, id)
        .await
        .map_err(ApiError::store("Failed to fetch note"))?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(note_id = %note.id, content_len = note.content.len(), "Summarizing note");

    let summary = state
        .summarizer
        .summarize(&note.content)
        .await
        .map_err(|error| {
            tracing::error!(
                note_id = %note.id,
                kind = error.kind().as_str(),
                error = %error,
                "Summarize failed"
            );
            ApiError::Summarize {
                error,
                expose_details: state.environment.is_development(),
            }
        })?;

    tracing::info!(note_id = %note.id, summary_len = summary.len(), "Note summarized");
    Ok(Json(SummaryResponse { summary }))
}

pub async fn api_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
