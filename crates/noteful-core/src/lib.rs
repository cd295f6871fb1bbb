//! # noteful-core
//!
//! Core types, traits, and abstractions for the noteful service.
//!
//! This crate provides the entity schemas (folders, tags, notes), identifier
//! validation, and the repository traits that the persistence layer
//! implements and the HTTP layer consumes.
//!
//! ## Log fields
//!
//! Structured log events across the workspace share these field names:
//! `subsystem` ("api", "db", "memory"), `component` ("folders", "tags",
//! "notes", "pool"), `op`, `folder_id`, `tag_id`, `note_id`,
//! `rows_affected`, `duration_ms` and `error`.

pub mod error;
pub mod ids;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use ids::{is_valid_id, new_v7, parse_id};
pub use models::*;
pub use traits::*;
