//! Note domain types.

pub mod model;

pub use model::{FieldError, Note, NoteDraft, NoteId, NoteInput, MAX_TITLE_CHARS};
