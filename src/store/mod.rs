//! Note persistence.
//!
//! # Responsibilities
//! - Owner-scoped find / insert / replace / delete of notes
//! - Assign ids and timestamps
//!
//! # Design Decisions
//! - Every operation takes the requesting principal; there is no unscoped read
//! - A note owned by someone else is indistinguishable from a missing one
//! - Backends sit behind `NoteStore` so the HTTP layer never sees storage types

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::notes::{Note, NoteDraft, NoteId};

pub use memory::MemoryNoteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes of `owner`, newest first.
    async fn list(&self, owner: &str) -> StoreResult<Vec<Note>>;

    async fn get(&self, owner: &str, id: NoteId) -> StoreResult<Option<Note>>;

    async fn insert(&self, owner: &str, draft: NoteDraft) -> StoreResult<Note>;

    /// Replace title and content. `None` when `owner` has no such note.
    async fn replace(&self, owner: &str, id: NoteId, draft: NoteDraft) -> StoreResult<Option<Note>>;

    /// Remove and return the note. `None` when `owner` has no such note.
    async fn delete(&self, owner: &str, id: NoteId) -> StoreResult<Option<Note>>;

    /// Flush to durable storage, if the backend has any.
    async fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}
