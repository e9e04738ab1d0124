//! SQLite-backed metadata reader for a Zotero data directory.

use super::{MetadataReader, ReaderError};
use crate::domain::{
    Attachment, AttachmentSource, CollectionId, CollectionRecord, Creator, Item, ItemId,
};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const DATABASE_FILE: &str = "zotero.sqlite";
pub const STORAGE_DIR: &str = "storage";

const STORAGE_PREFIX: &str = "storage:";
const BASE_DIR_PREFIX: &str = "attachments:";

static YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("valid year regex"));

/// Read-only handle on `zotero.sqlite`.
///
/// With snapshotting enabled the database file is copied into a private
/// temporary directory first, so a running Zotero instance holding its lock
/// does not block the export and every query sees the same state.
pub struct ZoteroDb {
    conn: Connection,
    data_dir: PathBuf,
    linked_base_dir: Option<PathBuf>,
    has_deleted_items: bool,
    has_deleted_collections: bool,
    // Dropped after `conn`, removing the copy.
    _snapshot: Option<TempDir>,
}

impl ZoteroDb {
    pub fn open(data_dir: &Path, snapshot: bool) -> Result<Self, ReaderError> {
        let db_path = data_dir.join(DATABASE_FILE);
        if !db_path.is_file() {
            return Err(ReaderError::DatabaseMissing { path: db_path });
        }

        let (open_path, snapshot_dir) = if snapshot {
            let dir = tempfile::Builder::new()
                .prefix("zotero_mirror_")
                .tempdir()
                .map_err(|source| ReaderError::Snapshot { path: db_path.clone(), source })?;
            let copy = dir.path().join(DATABASE_FILE);
            fs::copy(&db_path, &copy)
                .map_err(|source| ReaderError::Snapshot { path: db_path.clone(), source })?;
            tracing::debug!("Reading database snapshot {}", copy.display());
            (copy, Some(dir))
        } else {
            (db_path, None)
        };

        let conn = Connection::open_with_flags(
            &open_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let has_deleted_items = table_exists(&conn, "deletedItems")?;
        let has_deleted_collections = table_exists(&conn, "deletedCollections")?;

        Ok(Self {
            conn,
            data_dir: data_dir.to_path_buf(),
            linked_base_dir: None,
            has_deleted_items,
            has_deleted_collections,
            _snapshot: snapshot_dir,
        })
    }

    /// Base directory for attachments linked as `attachments:<relative path>`.
    pub fn with_linked_base_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.linked_base_dir = dir;
        self
    }

    fn item_fields(&self, item_id: ItemId) -> Result<(Option<String>, Option<String>), ReaderError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT f.fieldName, v.value
             FROM itemData d
             JOIN itemDataValues v ON v.valueID = d.valueID
             JOIN fields f ON f.fieldID = d.fieldID
             WHERE d.itemID = ?1 AND f.fieldName IN ('title', 'date')",
        )?;
        let rows = stmt.query_map(params![item_id], |row| {
            Ok((row.get::<_, String>(0)?, value_text(row.get::<_, Value>(1)?)))
        })?;

        let mut title = None;
        let mut year = None;
        for row in rows {
            let (name, value) = row?;
            let Some(value) = value else { continue };
            match name.as_str() {
                "title" if !value.trim().is_empty() => title = Some(value.trim().to_string()),
                "date" => year = extract_year(&value),
                _ => {}
            }
        }
        Ok((title, year))
    }

    fn item_creators(&self, item_id: ItemId) -> Result<Vec<Creator>, ReaderError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT c.firstName, c.lastName, ct.creatorType
             FROM itemCreators ic
             JOIN creators c ON c.creatorID = ic.creatorID
             LEFT JOIN creatorTypes ct ON ct.creatorTypeID = ic.creatorTypeID
             WHERE ic.itemID = ?1
             ORDER BY ic.orderIndex",
        )?;
        let rows = stmt.query_map(params![item_id], |row| {
            Ok(Creator {
                first_name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                last_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                creator_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn item_attachments(&self, item_id: ItemId) -> Result<Vec<Attachment>, ReaderError> {
        let sql = format!(
            "SELECT ia.itemID, i.key, ia.contentType, ia.path
             FROM itemAttachments ia
             JOIN items i ON i.itemID = ia.itemID
             WHERE ia.parentItemID = ?1 {}
             ORDER BY ia.itemID",
            if self.has_deleted_items {
                "AND NOT EXISTS (SELECT 1 FROM deletedItems di WHERE di.itemID = ia.itemID)"
            } else {
                ""
            }
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![item_id], |row| {
            Ok((
                row.get::<_, ItemId>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut attachments = Vec::new();
        for row in rows {
            let (id, key, content_type, path) = row?;
            let (file_name, source) = self.resolve_attachment_path(&key, path.as_deref());
            attachments.push(Attachment { id, file_name, content_type, source });
        }
        Ok(attachments)
    }

    fn resolve_attachment_path(
        &self,
        key: &str,
        raw: Option<&str>,
    ) -> (Option<String>, AttachmentSource) {
        let raw = match raw.map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => return (None, AttachmentSource::LinkOnly),
        };

        if let Some(name) = raw.strip_prefix(STORAGE_PREFIX) {
            let path = self.data_dir.join(STORAGE_DIR).join(key).join(name);
            return (Some(name.to_string()), AttachmentSource::Local(path));
        }

        if let Some(rel) = raw.strip_prefix(BASE_DIR_PREFIX) {
            let file_name = base_name(rel);
            return match &self.linked_base_dir {
                Some(base) => (file_name, AttachmentSource::Local(base.join(rel))),
                None => (file_name, AttachmentSource::Unresolved(rel.to_string())),
            };
        }

        (base_name(raw), AttachmentSource::Local(PathBuf::from(raw)))
    }
}

impl MetadataReader for ZoteroDb {
    fn collections(&self) -> Result<Vec<CollectionRecord>, ReaderError> {
        let sql = format!(
            "SELECT c.collectionID, c.key, c.collectionName, c.parentCollectionID
             FROM collections c {}
             ORDER BY c.collectionName, c.collectionID",
            if self.has_deleted_collections {
                "WHERE NOT EXISTS (SELECT 1 FROM deletedCollections dc WHERE dc.collectionID = c.collectionID)"
            } else {
                ""
            }
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(CollectionRecord {
                id: row.get(0)?,
                key: row.get(1)?,
                name: row.get(2)?,
                parent_id: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn collection_items(&self, collection_id: CollectionId) -> Result<Vec<Item>, ReaderError> {
        let sql = format!(
            "SELECT i.itemID, i.key
             FROM collectionItems ci
             JOIN items i ON i.itemID = ci.itemID
             JOIN itemTypes it ON it.itemTypeID = i.itemTypeID
             WHERE ci.collectionID = ?1
               AND it.typeName NOT IN ('note', 'attachment', 'annotation') {}
             ORDER BY ci.orderIndex, i.itemID",
            if self.has_deleted_items {
                "AND NOT EXISTS (SELECT 1 FROM deletedItems di WHERE di.itemID = i.itemID)"
            } else {
                ""
            }
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let heads = stmt
            .query_map(params![collection_id], |row| {
                Ok((row.get::<_, ItemId>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut items = Vec::with_capacity(heads.len());
        for (id, key) in heads {
            let (title, year) = self.item_fields(id)?;
            items.push(Item {
                id,
                key,
                title,
                year,
                creators: self.item_creators(id)?,
                attachments: self.item_attachments(id)?,
            });
        }
        Ok(items)
    }
}

fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![name],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

/// `itemDataValues.value` is untyped; Zotero may store numbers as integers.
fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text),
        Value::Integer(n) => Some(n.to_string()),
        Value::Real(n) => Some(n.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}

/// First four-digit run in a stored date such as `2019-03-00 March 2019`.
fn extract_year(date: &str) -> Option<String> {
    YEAR_PATTERN
        .find(date)
        .map(|m| m.as_str().to_string())
        .filter(|year| year != "0000")
}

fn base_name(path: &str) -> Option<String> {
    path.rsplit(|c: char| c == '/' || c == '\\').next().filter(|name| !name.is_empty()).map(str::to_string)
}
