//! Entity schemas and write payloads.
//!
//! Entities serialize with camelCase field names and RFC 3339 timestamps,
//! which is the wire format of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// FOLDERS
// =============================================================================

/// A named folder that notes can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Uuid,
    /// Unique, non-empty folder name
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written when creating or renaming a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderDraft {
    pub name: String,
}

// =============================================================================
// TAGS
// =============================================================================

/// A named label attachable to any number of notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    /// Unique, non-empty tag name
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written when creating or renaming a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDraft {
    pub name: String,
}

// =============================================================================
// NOTES
// =============================================================================

/// A note, optionally filed in a folder and carrying a set of tags.
///
/// `folder_id` and `tags` are references by id only. Existence of the
/// referenced folder or tag is not enforced on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub folder_id: Option<Uuid>,
    /// Tag ids, without duplicates
    pub tags: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Whether this note references `tag_id`.
    pub fn has_tag(&self, tag_id: Uuid) -> bool {
        self.tags.contains(&tag_id)
    }
}

/// Fields written when creating or replacing a note.
///
/// On create, `tags: None` means an empty set. On replace, `tags: None`
/// leaves the stored set untouched; every other field is overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: Option<String>,
    pub folder_id: Option<Uuid>,
    pub tags: Option<Vec<Uuid>>,
}

impl NoteDraft {
    /// Build a draft, collapsing repeated tag ids (first occurrence wins).
    pub fn new(
        title: impl Into<String>,
        content: Option<String>,
        folder_id: Option<Uuid>,
        tags: Option<Vec<Uuid>>,
    ) -> Self {
        Self {
            title: title.into(),
            content,
            folder_id,
            tags: tags.map(dedup_preserving_order),
        }
    }
}

fn dedup_preserving_order(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Filters for listing notes. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Case-insensitive substring of the title
    pub search_term: Option<String>,
    /// Exact folder match
    pub folder_id: Option<Uuid>,
    /// Notes carrying this tag
    pub tag_id: Option<Uuid>,
}

impl NoteFilter {
    /// Evaluate the filter against a note in memory.
    ///
    /// Stores that filter server-side must agree with this definition.
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(term) = &self.search_term {
            if !note.title.to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }
        if let Some(folder_id) = self.folder_id {
            if note.folder_id != Some(folder_id) {
                return false;
            }
        }
        if let Some(tag_id) = self.tag_id {
            if !note.has_tag(tag_id) {
                return false;
            }
        }
        true
    }

    /// True when no filter is set.
    pub fn is_empty(&self) -> bool {
        self.search_term.is_none() && self.folder_id.is_none() && self.tag_id.is_none()
    }
}
