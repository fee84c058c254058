//! Notes service: ownership enforcement and store orchestration.
//!
//! Every operation verifies that the caller owns the note before touching
//! it. Absent notes and notes owned by someone else are indistinguishable
//! in the result, so existence is never confirmed to non-owners.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, error};
use utoipa::ToSchema;
use uuid::Uuid;

use scrawl_core::{
    validate_title, Error, Note, NoteFieldUpdate, NoteStore, Result, ServiceReply,
};

/// Request body for note creation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateNote {
    /// Note title, 1–200 characters.
    pub title: String,
    /// Note content. Required, may be an empty string.
    pub content: String,
}

/// Request body for note updates. At least one field must be present.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateNote {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdateNote {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// Single failure message for "absent" and "owned by someone else" alike.
pub const NOT_FOUND_MSG: &str = "Note not found or you don't have permission to access it";

/// Orchestration layer over the note store.
#[derive(Clone)]
pub struct NotesService {
    store: Arc<dyn NoteStore>,
}

impl NotesService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    /// Fetch a note and verify the caller owns it.
    async fn fetch_owned(&self, id: Uuid, user_id: &str) -> Result<Note> {
        let note = self.store.fetch(id).await.map_err(|e| {
            error!(note_id = %id, error = %e, "Failed to fetch note");
            Error::Internal("Failed to fetch note".to_string())
        })?;

        match note {
            Some(note) if note.user_id == user_id => Ok(note),
            _ => Err(Error::NotFound(NOT_FOUND_MSG.to_string())),
        }
    }

    /// Create a note owned by `user_id`.
    pub async fn create(&self, input: CreateNote, user_id: &str) -> Result<ServiceReply<Note>> {
        validate_title(&input.title)?;

        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: input.title,
            content: input.content,
            created_at: now,
            updated_at: now,
        };

        self.store.insert(&note).await.map_err(|e| {
            error!(note_id = %note.id, error = %e, "Failed to create note");
            Error::Internal("Failed to create note".to_string())
        })?;

        debug!(note_id = %note.id, user_id = %note.user_id, "Note created");
        Ok(ServiceReply {
            message: "Note created successfully".to_string(),
            data: note,
        })
    }

    /// List all notes owned by `user_id`, newest first. An empty list is
    /// a success, not an error.
    pub async fn list(&self, user_id: &str) -> Result<ServiceReply<Vec<Note>>> {
        let notes = self.store.list_for_user(user_id).await.map_err(|e| {
            error!(user_id, error = %e, "Failed to fetch notes");
            Error::Internal("Failed to fetch notes".to_string())
        })?;

        Ok(ServiceReply {
            message: format!("Retrieved {} notes successfully", notes.len()),
            data: notes,
        })
    }

    /// Fetch a single owned note.
    pub async fn get(&self, id: Uuid, user_id: &str) -> Result<ServiceReply<Note>> {
        let note = self.fetch_owned(id, user_id).await?;
        Ok(ServiceReply {
            message: "Note retrieved successfully".to_string(),
            data: note,
        })
    }

    /// Apply a partial update to an owned note. Only supplied fields
    /// change; `updated_at` always advances.
    pub async fn update(
        &self,
        id: Uuid,
        patch: UpdateNote,
        user_id: &str,
    ) -> Result<ServiceReply<Note>> {
        if patch.is_empty() {
            return Err(Error::InvalidInput(
                "At least one field must be provided for update".to_string(),
            ));
        }
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }

        let mut note = self.fetch_owned(id, user_id).await?;

        let update = NoteFieldUpdate {
            title: patch.title,
            content: patch.content,
            updated_at: Utc::now(),
        };
        let applied = self
            .store
            .update_fields(id, update.clone())
            .await
            .map_err(|e| {
                error!(note_id = %id, error = %e, "Failed to update note");
                Error::Internal("Failed to update note".to_string())
            })?;
        if !applied {
            // The note vanished between the ownership check and the write.
            return Err(Error::NotFound(NOT_FOUND_MSG.to_string()));
        }

        if let Some(title) = update.title {
            note.title = title;
        }
        if let Some(content) = update.content {
            note.content = content;
        }
        note.updated_at = update.updated_at;

        debug!(note_id = %id, user_id, "Note updated");
        Ok(ServiceReply {
            message: "Note updated successfully".to_string(),
            data: note,
        })
    }

    /// Permanently delete an owned note. Hard delete; no recovery path.
    pub async fn delete(&self, id: Uuid, user_id: &str) -> Result<ServiceReply<()>> {
        self.fetch_owned(id, user_id).await?;

        let removed = self.store.delete(id).await.map_err(|e| {
            error!(note_id = %id, error = %e, "Failed to delete note");
            Error::Internal("Failed to delete note".to_string())
        })?;
        if !removed {
            return Err(Error::NotFound(NOT_FOUND_MSG.to_string()));
        }

        debug!(note_id = %id, user_id, "Note deleted");
        Ok(ServiceReply {
            message: "Note deleted successfully".to_string(),
            data: (),
        })
    }
}
