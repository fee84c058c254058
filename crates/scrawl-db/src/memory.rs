//! In-memory fallback note store.
//!
//! Process-lifetime storage for environments without a configured
//! database. Read-modify-write sequences run under the write lock, so
//! concurrent requests cannot interleave between fetch and apply.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use scrawl_core::{Note, NoteFieldUpdate, NoteStore, Result};

/// In-memory [`NoteStore`] implementation. No persistence across restarts.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: RwLock<HashMap<Uuid, Note>>,
}

impl MemoryNoteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn insert(&self, note: &Note) -> Result<()> {
        self.notes.write().await.insert(note.id, note.clone());
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Note>> {
        Ok(self.notes.read().await.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Note>> {
        let notes = self.notes.read().await;
        let mut owned: Vec<Note> = notes
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn update_fields(&self, id: Uuid, update: NoteFieldUpdate) -> Result<bool> {
        let mut notes = self.notes.write().await;
        match notes.get_mut(&id) {
            Some(note) => {
                if let Some(title) = update.title {
                    note.title = title;
                }
                if let Some(content) = update.content {
                    note.content = content;
                }
                note.updated_at = update.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.notes.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn note(user_id: &str, title: &str, offset_secs: i64) -> Note {
        let at = Utc::now() + Duration::seconds(offset_secs);
        Note {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            content: String::new(),
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_fetch_missing_is_none_not_error() {
        let store = MemoryNoteStore::new();
        let result = store.fetch(Uuid::new_v4()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_insert_then_fetch_round_trips() {
        let store = MemoryNoteStore::new();
        let n = note("u1", "First", 0);
        store.insert(&n).await.unwrap();

        let fetched = store.fetch(n.id).await.unwrap().unwrap();
        assert_eq!(fetched, n);
    }

    #[tokio::test]
    async fn test_list_filters_by_owner_and_sorts_newest_first() {
        let store = MemoryNoteStore::new();
        let older = note("u1", "older", 0);
        let newer = note("u1", "newer", 10);
        let foreign = note("u2", "other user", 5);
        store.insert(&older).await.unwrap();
        store.insert(&newer).await.unwrap();
        store.insert(&foreign).await.unwrap();

        let listed = store.list_for_user("u1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
        assert!(listed.iter().all(|n| n.user_id == "u1"));
    }

    #[tokio::test]
    async fn test_list_for_unknown_user_is_empty() {
        let store = MemoryNoteStore::new();
        assert!(store.list_for_user("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_fields_applies_only_supplied_fields() {
        let store = MemoryNoteStore::new();
        let n = note("u1", "Title", 0);
        store.insert(&n).await.unwrap();

        let later = Utc::now() + Duration::seconds(5);
        let applied = store
            .update_fields(
                n.id,
                NoteFieldUpdate {
                    title: Some("Renamed".to_string()),
                    content: None,
                    updated_at: later,
                },
            )
            .await
            .unwrap();
        assert!(applied);

        let fetched = store.fetch(n.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Renamed");
        assert_eq!(fetched.content, n.content);
        assert_eq!(fetched.updated_at, later);
        assert_eq!(fetched.created_at, n.created_at);
    }

    #[tokio::test]
    async fn test_update_fields_missing_note_returns_false() {
        let store = MemoryNoteStore::new();
        let applied = store
            .update_fields(
                Uuid::new_v4(),
                NoteFieldUpdate {
                    title: Some("x".to_string()),
                    content: None,
                    updated_at: Utc::now(),
                },
            )
            .await
            .unwrap();
        assert!(!applied);
    }

    #[tokio::test]
    async fn test_delete_removes_and_reports_missing() {
        let store = MemoryNoteStore::new();
        let n = note("u1", "gone soon", 0);
        store.insert(&n).await.unwrap();

        assert!(store.delete(n.id).await.unwrap());
        assert!(store.fetch(n.id).await.unwrap().is_none());
        // Second delete signals "missing" instead of raising
        assert!(!store.delete(n.id).await.unwrap());
    }
}
