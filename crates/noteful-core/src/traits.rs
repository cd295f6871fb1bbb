//! Repository traits implemented by the persistence layer.
//!
//! Each collection offers the same primitives: insert one, find sorted,
//! find by id, update by id, delete by id. Lookups and updates report a
//! missing document as `Ok(None)`; unique-field conflicts surface as
//! [`Error::DuplicateKey`](crate::Error::DuplicateKey).

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{Folder, FolderDraft, Note, NoteDraft, NoteFilter, Result, Tag, TagDraft};

// =============================================================================
// FOLDER REPOSITORY
// =============================================================================

/// Repository for folder operations.
#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// List all folders ordered by name.
    async fn list(&self) -> Result<Vec<Folder>>;

    /// Get a folder by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Folder>>;

    /// Create a folder. Fails with `DuplicateKey` if the name is taken.
    async fn create(&self, draft: &FolderDraft) -> Result<Folder>;

    /// Overwrite a folder's fields, returning the updated folder.
    async fn update(&self, id: Uuid, draft: &FolderDraft) -> Result<Option<Folder>>;

    /// Delete a folder. Returns whether a folder was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

// =============================================================================
// TAG REPOSITORY
// =============================================================================

/// Repository for tag operations.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// List all tags ordered by name.
    async fn list(&self) -> Result<Vec<Tag>>;

    /// Get a tag by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Tag>>;

    /// Create a tag. Fails with `DuplicateKey` if the name is taken.
    async fn create(&self, draft: &TagDraft) -> Result<Tag>;

    /// Overwrite a tag's fields, returning the updated tag.
    async fn update(&self, id: Uuid, draft: &TagDraft) -> Result<Option<Tag>>;

    /// Delete a tag. Returns whether a tag was removed.
    ///
    /// Notes referencing the tag are not touched here; see
    /// [`NoteRepository::remove_tag`].
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Repository for note operations.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// List notes matching `filter`, ordered by id ascending.
    async fn list(&self, filter: &NoteFilter) -> Result<Vec<Note>>;

    /// Get a note by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Note>>;

    /// Create a note. Absent tags are stored as an empty set.
    async fn create(&self, draft: &NoteDraft) -> Result<Note>;

    /// Replace a note's title, content and folder (and tags, when given).
    async fn update(&self, id: Uuid, draft: &NoteDraft) -> Result<Option<Note>>;

    /// Delete a note. Returns whether a note was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Remove `tag_id` from the tag set of every note holding it.
    /// Returns the number of notes changed.
    async fn remove_tag(&self, tag_id: Uuid) -> Result<u64>;

    /// Clear `folder_id` on every note filed in that folder.
    /// Returns the number of notes changed.
    async fn clear_folder(&self, folder_id: Uuid) -> Result<u64>;
}

/// Handles to every collection of one persistence service.
///
/// Built once at startup and shared by all request handlers.
#[derive(Clone)]
pub struct Repositories {
    pub folders: Arc<dyn FolderRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub notes: Arc<dyn NoteRepository>,
}

impl Repositories {
    pub fn new(
        folders: Arc<dyn FolderRepository>,
        tags: Arc<dyn TagRepository>,
        notes: Arc<dyn NoteRepository>,
    ) -> Self {
        Self {
            folders,
            tags,
            notes,
        }
    }
}
