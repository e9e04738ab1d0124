//! Read-only access to the Zotero library database.

use crate::domain::{CollectionId, CollectionRecord, Item};
use std::path::PathBuf;

#[cfg(test)]
pub mod fixture;
pub mod hierarchy;
pub mod sqlite;

pub use hierarchy::{build_forest, build_subtree, find_root};
pub use sqlite::ZoteroDb;

#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("Zotero database not found at {}", path.display())]
    DatabaseMissing { path: PathBuf },

    #[error("Failed to snapshot database {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Source of collection and item records for an export run.
pub trait MetadataReader {
    /// Every live collection as flat rows, ordered by name.
    fn collections(&self) -> Result<Vec<CollectionRecord>, ReaderError>;

    /// Regular items filed directly in `collection_id`, with their attachments.
    fn collection_items(&self, collection_id: CollectionId) -> Result<Vec<Item>, ReaderError>;
}
