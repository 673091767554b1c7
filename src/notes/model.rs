//! Note entity and input validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest accepted title, in characters, after trimming.
pub const MAX_TITLE_CHARS: usize = 100;

pub type NoteId = Uuid;

/// A stored note. Always belongs to exactly one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for create and replace. Fields are optional so a missing
/// field is reported as a validation error instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Validated, trimmed title and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl NoteInput {
    pub fn validate(self) -> Result<NoteDraft, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = self.title.as_deref().unwrap_or_default().trim().to_string();
        if title.is_empty() {
            errors.push(FieldError {
                field: "title",
                message: "Title is required",
            });
        } else if title.chars().count() > MAX_TITLE_CHARS {
            errors.push(FieldError {
                field: "title",
                message: "Title must be less than 100 characters",
            });
        }

        let content = self.content.as_deref().unwrap_or_default().trim().to_string();
        if content.is_empty() {
            errors.push(FieldError {
                field: "content",
                message: "Content is required",
            });
        }

        if errors.is_empty() {
            Ok(NoteDraft { title, content })
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: Option<&str>, content: Option<&str>) -> NoteInput {
        NoteInput {
            title: title.map(str::to_string),
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_input_is_trimmed() {
        let draft = input(Some("  Groceries "), Some("\n milk, eggs \n")).validate().unwrap();
        assert_eq!(draft.title, "Groceries");
        assert_eq!(draft.content, "milk, eggs");
    }

    #[test]
    fn test_missing_fields() {
        let errors = input(None, Some("   ")).validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError { field: "title", message: "Title is required" },
                FieldError { field: "content", message: "Content is required" },
            ]
        );
    }

    #[test]
    fn test_title_length_counts_chars() {
        let at_limit = "é".repeat(MAX_TITLE_CHARS);
        assert!(input(Some(&at_limit), Some("x")).validate().is_ok());

        let over = "a".repeat(MAX_TITLE_CHARS + 1);
        let errors = input(Some(&over), Some("x")).validate().unwrap_err();
        assert_eq!(errors[0].message, "Title must be less than 100 characters");
    }

    #[test]
    fn test_note_serializes_camel_case() {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            owner_id: "u1".into(),
            title: "t".into(),
            content: "c".into(),
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["ownerId"], "u1");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }
}
