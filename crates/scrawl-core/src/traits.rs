//! Core traits for scrawl abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Identity, Note};

// =============================================================================
// NOTE STORE
// =============================================================================

/// Partial field update applied by a note store.
///
/// `updated_at` is mandatory: every update refreshes the timestamp even
/// when only one of the optional fields is supplied.
#[derive(Debug, Clone)]
pub struct NoteFieldUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Storage backend for notes.
///
/// All implementations present identical observable semantics: listing is
/// newest-first by creation time, and absent keys are signalled as
/// `None`/`false` rather than raised as errors.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert a new note record.
    async fn insert(&self, note: &Note) -> Result<()>;

    /// Fetch a note by id. Absent keys yield `Ok(None)`.
    async fn fetch(&self, id: Uuid) -> Result<Option<Note>>;

    /// List all notes owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Note>>;

    /// Apply the supplied fields to an existing note.
    ///
    /// Returns `false` when the note does not exist.
    async fn update_fields(&self, id: Uuid, update: NoteFieldUpdate) -> Result<bool>;

    /// Permanently remove a note. Returns `false` when the note does not exist.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

// =============================================================================
// TOKEN VERIFICATION
// =============================================================================

/// Resolves an optional bearer credential into an [`Identity`].
///
/// Stateless: verification is a pure function of the credential and the
/// provider configuration. Rejections carry a human-readable reason in
/// [`crate::Error::Unauthorized`].
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a credential. `None` means no `Authorization` header was supplied.
    async fn verify(&self, credential: Option<&str>) -> Result<Identity>;
}
