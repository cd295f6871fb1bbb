//! The three collections served by the generic controller.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use noteful_core::{
    Folder, FolderDraft, Note, NoteDraft, NoteFilter, Repositories, Result, Tag, TagDraft,
};

use crate::{
    controller::Resource,
    error::ApiError,
    validation::{id_list, non_empty, optional_id, required},
};

/// Body accepted by folder and tag writes.
#[derive(Debug, Deserialize)]
pub struct NameBody {
    pub name: Option<String>,
}

/// Collections without list filters.
#[derive(Debug, Default, Deserialize)]
pub struct NoQuery {}

// =============================================================================
// FOLDERS
// =============================================================================

pub struct Folders;

#[async_trait]
impl Resource for Folders {
    const COLLECTION: &'static str = "folders";
    const ENTITY: &'static str = "folder";

    type Entity = Folder;
    type Body = NameBody;
    type Draft = FolderDraft;
    type Query = NoQuery;
    type Filter = ();

    fn validate(body: NameBody) -> std::result::Result<FolderDraft, ApiError> {
        Ok(FolderDraft {
            name: required("name", body.name)?,
        })
    }

    fn filter(_query: NoQuery) -> std::result::Result<(), ApiError> {
        Ok(())
    }

    fn id_of(folder: &Folder) -> Uuid {
        folder.id
    }

    async fn list(repos: &Repositories, _filter: &()) -> Result<Vec<Folder>> {
        repos.folders.list().await
    }

    async fn fetch(repos: &Repositories, id: Uuid) -> Result<Option<Folder>> {
        repos.folders.get(id).await
    }

    async fn insert(repos: &Repositories, draft: &FolderDraft) -> Result<Folder> {
        repos.folders.create(draft).await
    }

    async fn replace(
        repos: &Repositories,
        id: Uuid,
        draft: &FolderDraft,
    ) -> Result<Option<Folder>> {
        repos.folders.update(id, draft).await
    }

    /// Notes filed in the folder become unfiled.
    async fn remove(repos: &Repositories, id: Uuid) -> Result<()> {
        repos.folders.delete(id).await?;
        let cleared = repos.notes.clear_folder(id).await?;
        debug!(
            subsystem = "api",
            component = "folders",
            folder_id = %id,
            rows_affected = cleared,
            "Cleared folder from notes"
        );
        Ok(())
    }
}

// =============================================================================
// TAGS
// =============================================================================

pub struct Tags;

#[async_trait]
impl Resource for Tags {
    const COLLECTION: &'static str = "tags";
    const ENTITY: &'static str = "tag";

    type Entity = Tag;
    type Body = NameBody;
    type Draft = TagDraft;
    type Query = NoQuery;
    type Filter = ();

    fn validate(body: NameBody) -> std::result::Result<TagDraft, ApiError> {
        Ok(TagDraft {
            name: required("name", body.name)?,
        })
    }

    fn filter(_query: NoQuery) -> std::result::Result<(), ApiError> {
        Ok(())
    }

    fn id_of(tag: &Tag) -> Uuid {
        tag.id
    }

    async fn list(repos: &Repositories, _filter: &()) -> Result<Vec<Tag>> {
        repos.tags.list().await
    }

    async fn fetch(repos: &Repositories, id: Uuid) -> Result<Option<Tag>> {
        repos.tags.get(id).await
    }

    async fn insert(repos: &Repositories, draft: &TagDraft) -> Result<Tag> {
        repos.tags.create(draft).await
    }

    async fn replace(repos: &Repositories, id: Uuid, draft: &TagDraft) -> Result<Option<Tag>> {
        repos.tags.update(id, draft).await
    }

    /// The tag is pulled from every note that carries it.
    ///
    /// The two writes are not atomic. The cleanup runs even when the tag was
    /// already gone, so repeating the delete repairs notes left behind by an
    /// interrupted earlier attempt.
    async fn remove(repos: &Repositories, id: Uuid) -> Result<()> {
        repos.tags.delete(id).await?;
        let pulled = repos.notes.remove_tag(id).await?;
        debug!(
            subsystem = "api",
            component = "tags",
            tag_id = %id,
            rows_affected = pulled,
            "Removed tag from notes"
        );
        Ok(())
    }
}

// =============================================================================
// NOTES
// =============================================================================

pub struct Notes;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteBody {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder_id: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteQuery {
    pub search_term: Option<String>,
    pub folder_id: Option<String>,
    pub tag_id: Option<String>,
}

#[async_trait]
impl Resource for Notes {
    const COLLECTION: &'static str = "notes";
    const ENTITY: &'static str = "note";

    type Entity = Note;
    type Body = NoteBody;
    type Draft = NoteDraft;
    type Query = NoteQuery;
    type Filter = NoteFilter;

    fn validate(body: NoteBody) -> std::result::Result<NoteDraft, ApiError> {
        let title = required("title", body.title)?;
        let folder_id = optional_id("folderId", body.folder_id)?;
        let tags = id_list("tags", body.tags)?;
        Ok(NoteDraft::new(title, body.content, folder_id, tags))
    }

    fn filter(query: NoteQuery) -> std::result::Result<NoteFilter, ApiError> {
        Ok(NoteFilter {
            search_term: non_empty(query.search_term),
            folder_id: optional_id("folderId", query.folder_id)?,
            tag_id: optional_id("tagId", query.tag_id)?,
        })
    }

    fn id_of(note: &Note) -> Uuid {
        note.id
    }

    async fn list(repos: &Repositories, filter: &NoteFilter) -> Result<Vec<Note>> {
        repos.notes.list(filter).await
    }

    async fn fetch(repos: &Repositories, id: Uuid) -> Result<Option<Note>> {
        repos.notes.get(id).await
    }

    async fn insert(repos: &Repositories, draft: &NoteDraft) -> Result<Note> {
        repos.notes.create(draft).await
    }

    async fn replace(repos: &Repositories, id: Uuid, draft: &NoteDraft) -> Result<Option<Note>> {
        repos.notes.update(id, draft).await
    }

    async fn remove(repos: &Repositories, id: Uuid) -> Result<()> {
        repos.notes.delete(id).await?;
        Ok(())
    }
}
