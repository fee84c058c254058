//! Data models for scrawl.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// A user-owned note. The sole persisted entity.
///
/// `id` and `user_id` are immutable after creation; `updated_at` never
/// moves backwards relative to `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Note {
    /// Unique note identifier, generated at creation.
    pub id: Uuid,
    /// Identifier of the owning user.
    pub user_id: String,
    /// Note title, 1–200 characters.
    pub title: String,
    /// Note content. May be empty; no length constraint.
    pub content: String,
    /// Creation timestamp, set once.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update.
    pub updated_at: DateTime<Utc>,
}

/// Identity resolved from a bearer credential.
///
/// Produced transiently per request by a [`crate::TokenVerifier`];
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user identifier from the identity provider.
    pub user_id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Successful service outcome: the human-readable summary used directly
/// in API responses, plus the operation-specific payload.
#[derive(Debug, Clone)]
pub struct ServiceReply<T> {
    pub message: String,
    pub data: T,
}

/// Validate a note title: required, at most [`TITLE_MAX_CHARS`] characters.
pub fn validate_title(title: &str) -> Result<()> {
    let len = title.chars().count();
    if len == 0 {
        return Err(Error::InvalidInput("Title is required".to_string()));
    }
    if len > TITLE_MAX_CHARS {
        return Err(Error::InvalidInput(format!(
            "Title must be at most {} characters",
            TITLE_MAX_CHARS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title_accepts_normal_titles() {
        assert!(validate_title("Groceries").is_ok());
        assert!(validate_title("a").is_ok());
    }

    #[test]
    fn test_validate_title_rejects_empty() {
        match validate_title("") {
            Err(Error::InvalidInput(msg)) => assert_eq!(msg, "Title is required"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_title_boundary_lengths() {
        let exactly_max: String = "x".repeat(TITLE_MAX_CHARS);
        assert!(validate_title(&exactly_max).is_ok());

        let too_long: String = "x".repeat(TITLE_MAX_CHARS + 1);
        assert!(validate_title(&too_long).is_err());
    }

    #[test]
    fn test_validate_title_counts_characters_not_bytes() {
        // 200 multi-byte characters is still a valid title
        let title: String = "ä".repeat(TITLE_MAX_CHARS);
        assert!(validate_title(&title).is_ok());
    }

    #[test]
    fn test_note_serializes_with_expected_fields() {
        let note = Note {
            id: Uuid::nil(),
            user_id: "u1".to_string(),
            title: "A".to_string(),
            content: "B".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("id").is_some());
        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["title"], "A");
        assert_eq!(json["content"], "B");
        assert!(json.get("created_at").is_some());
        assert!(json.get("updated_at").is_some());
    }
}
