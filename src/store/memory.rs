//! In-memory note store with optional JSON snapshot persistence.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::notes::{Note, NoteDraft, NoteId};
use crate::observability::metrics;
use crate::store::{NoteStore, StoreResult};

/// A thread-safe note store keyed by note id.
#[derive(Clone, Default)]
pub struct MemoryNoteStore {
    inner: Arc<DashMap<NoteId, Note>>,
    persistence_path: Option<PathBuf>,
}

impl MemoryNoteStore {
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            persistence_path,
        }
    }

    /// Open a store backed by `path`, loading the snapshot if it exists.
    pub fn load_from_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let notes: Vec<Note> = serde_json::from_reader(reader)?;
            for note in notes {
                store.inner.insert(note.id, note);
            }
            tracing::info!(count = store.inner.len(), path = ?path, "Loaded notes from snapshot");
        }
        metrics::record_store_size(store.inner.len());
        Ok(store)
    }

    /// Write the snapshot, if a path is configured. Replaces the file atomically.
    pub fn save_to_file(&self) -> StoreResult<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };

        let notes: Vec<Note> = self.inner.iter().map(|r| r.value().clone()).collect();
        let tmp = path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(&mut writer, &notes)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);
        // Only a fully written snapshot may replace the previous one.
        fs::rename(&tmp, path)?;
        tracing::info!(count = notes.len(), path = ?path, "Saved notes snapshot");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn list(&self, owner: &str) -> StoreResult<Vec<Note>> {
        let mut notes: Vec<Note> = self
            .inner
            .iter()
            .filter(|r| r.value().owner_id == owner)
            .map(|r| r.value().clone())
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(notes)
    }

    async fn get(&self, owner: &str, id: NoteId) -> StoreResult<Option<Note>> {
        Ok(self
            .inner
            .get(&id)
            .filter(|r| r.value().owner_id == owner)
            .map(|r| r.value().clone()))
    }

    async fn insert(&self, owner: &str, draft: NoteDraft) -> StoreResult<Note> {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            owner_id: owner.to_string(),
            title: draft.title,
            content: draft.content,
            created_at: now,
            updated_at: now,
        };
        self.inner.insert(note.id, note.clone());
        metrics::record_store_size(self.inner.len());
        Ok(note)
    }

    async fn replace(
        &self,
        owner: &str,
        id: NoteId,
        draft: NoteDraft,
    ) -> StoreResult<Option<Note>> {
        let Some(mut entry) = self.inner.get_mut(&id) else {
            return Ok(None);
        };
        if entry.owner_id != owner {
            return Ok(None);
        }
        entry.title = draft.title;
        entry.content = draft.content;
        entry.updated_at = Utc::now().max(entry.created_at);
        Ok(Some(entry.value().clone()))
    }

    async fn delete(&self, owner: &str, id: NoteId) -> StoreResult<Option<Note>> {
        let removed = self
            .inner
            .remove_if(&id, |_, note| note.owner_id == owner)
            .map(|(_, note)| note);
        metrics::record_store_size(self.inner.len());
        Ok(removed)
    }

    async fn flush(&self) -> StoreResult<()> {
        self.save_to_file()
    }
}
