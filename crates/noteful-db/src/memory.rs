//! In-memory persistence.
//!
//! Implements the repository traits over `RwLock`-guarded maps with the same
//! observable behaviour as the PostgreSQL repositories: unique names,
//! timestamps set on write, `None` for missing documents, id-ordered note
//! listings. Used by the API test-suite and for running the server without a
//! database.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use noteful_core::{
    new_v7, Error, Folder, FolderDraft, FolderRepository, Note, NoteDraft, NoteFilter,
    NoteRepository, Repositories, Result, Tag, TagDraft, TagRepository,
};

/// Entities with a unique `name` field (folders and tags).
trait Named: Clone + Send + Sync {
    const UNIQUE_CONSTRAINT: &'static str;

    fn build(id: Uuid, name: String, now: DateTime<Utc>) -> Self;
    fn name(&self) -> &str;
    fn rename(&mut self, name: String, now: DateTime<Utc>);
}

impl Named for Folder {
    const UNIQUE_CONSTRAINT: &'static str = "folder_name_key";

    fn build(id: Uuid, name: String, now: DateTime<Utc>) -> Self {
        Folder {
            id,
            name,
            created_at: now,
            updated_at: now,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn rename(&mut self, name: String, now: DateTime<Utc>) {
        self.name = name;
        self.updated_at = now;
    }
}

impl Named for Tag {
    const UNIQUE_CONSTRAINT: &'static str = "tag_name_key";

    fn build(id: Uuid, name: String, now: DateTime<Utc>) -> Self {
        Tag {
            id,
            name,
            created_at: now,
            updated_at: now,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn rename(&mut self, name: String, now: DateTime<Utc>) {
        self.name = name;
        self.updated_at = now;
    }
}

/// A collection of named documents keyed by id.
struct NamedCollection<T> {
    docs: RwLock<BTreeMap<Uuid, T>>,
}

impl<T: Named> NamedCollection<T> {
    fn new() -> Self {
        Self {
            docs: RwLock::new(BTreeMap::new()),
        }
    }

    async fn list(&self) -> Vec<T> {
        let docs = self.docs.read().await;
        // BTreeMap iterates by id, so equal names keep id order after the stable sort.
        let mut all: Vec<T> = docs.values().cloned().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    async fn get(&self, id: Uuid) -> Option<T> {
        self.docs.read().await.get(&id).cloned()
    }

    async fn create(&self, name: &str) -> Result<T> {
        let mut docs = self.docs.write().await;
        if docs.values().any(|d| d.name() == name) {
            return Err(Error::DuplicateKey(T::UNIQUE_CONSTRAINT.to_string()));
        }
        let id = new_v7();
        let doc = T::build(id, name.to_string(), Utc::now());
        docs.insert(id, doc.clone());
        Ok(doc)
    }

    async fn update(&self, id: Uuid, name: &str) -> Result<Option<T>> {
        let mut docs = self.docs.write().await;
        if docs
            .iter()
            .any(|(other, d)| *other != id && d.name() == name)
        {
            return Err(Error::DuplicateKey(T::UNIQUE_CONSTRAINT.to_string()));
        }
        Ok(docs.get_mut(&id).map(|doc| {
            doc.rename(name.to_string(), Utc::now());
            doc.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> bool {
        self.docs.write().await.remove(&id).is_some()
    }
}

/// In-memory folder collection.
pub struct MemoryFolderRepository {
    inner: NamedCollection<Folder>,
}

#[async_trait]
impl FolderRepository for MemoryFolderRepository {
    async fn list(&self) -> Result<Vec<Folder>> {
        Ok(self.inner.list().await)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Folder>> {
        Ok(self.inner.get(id).await)
    }

    async fn create(&self, draft: &FolderDraft) -> Result<Folder> {
        self.inner.create(&draft.name).await
    }

    async fn update(&self, id: Uuid, draft: &FolderDraft) -> Result<Option<Folder>> {
        self.inner.update(id, &draft.name).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.inner.delete(id).await)
    }
}

/// In-memory tag collection.
pub struct MemoryTagRepository {
    inner: NamedCollection<Tag>,
}

#[async_trait]
impl TagRepository for MemoryTagRepository {
    async fn list(&self) -> Result<Vec<Tag>> {
        Ok(self.inner.list().await)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Tag>> {
        Ok(self.inner.get(id).await)
    }

    async fn create(&self, draft: &TagDraft) -> Result<Tag> {
        self.inner.create(&draft.name).await
    }

    async fn update(&self, id: Uuid, draft: &TagDraft) -> Result<Option<Tag>> {
        self.inner.update(id, &draft.name).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.inner.delete(id).await)
    }
}

/// In-memory note collection.
pub struct MemoryNoteRepository {
    docs: RwLock<BTreeMap<Uuid, Note>>,
}

#[async_trait]
impl NoteRepository for MemoryNoteRepository {
    async fn list(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        let docs = self.docs.read().await;
        Ok(docs.values().filter(|n| filter.matches(n)).cloned().collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Note>> {
        Ok(self.docs.read().await.get(&id).cloned())
    }

    async fn create(&self, draft: &NoteDraft) -> Result<Note> {
        let now = Utc::now();
        let note = Note {
            id: new_v7(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            folder_id: draft.folder_id,
            tags: draft.tags.clone().unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.docs.write().await.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update(&self, id: Uuid, draft: &NoteDraft) -> Result<Option<Note>> {
        let mut docs = self.docs.write().await;
        Ok(docs.get_mut(&id).map(|note| {
            note.title = draft.title.clone();
            note.content = draft.content.clone();
            note.folder_id = draft.folder_id;
            if let Some(tags) = &draft.tags {
                note.tags = tags.clone();
            }
            note.updated_at = Utc::now();
            note.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.docs.write().await.remove(&id).is_some())
    }

    async fn remove_tag(&self, tag_id: Uuid) -> Result<u64> {
        let mut docs = self.docs.write().await;
        let now = Utc::now();
        let mut changed = 0;
        for note in docs.values_mut().filter(|n| n.has_tag(tag_id)) {
            note.tags.retain(|t| *t != tag_id);
            note.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }

    async fn clear_folder(&self, folder_id: Uuid) -> Result<u64> {
        let mut docs = self.docs.write().await;
        let now = Utc::now();
        let mut changed = 0;
        for note in docs
            .values_mut()
            .filter(|n| n.folder_id == Some(folder_id))
        {
            note.folder_id = None;
            note.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }
}

/// All three collections held in process memory.
#[derive(Clone)]
pub struct MemoryStore {
    pub folders: Arc<MemoryFolderRepository>,
    pub tags: Arc<MemoryTagRepository>,
    pub notes: Arc<MemoryNoteRepository>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            folders: Arc::new(MemoryFolderRepository {
                inner: NamedCollection::new(),
            }),
            tags: Arc::new(MemoryTagRepository {
                inner: NamedCollection::new(),
            }),
            notes: Arc::new(MemoryNoteRepository {
                docs: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    /// Repository handles sharing this store's data.
    pub fn repositories(&self) -> Repositories {
        Repositories::new(
            self.folders.clone(),
            self.tags.clone(),
            self.notes.clone(),
        )
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
