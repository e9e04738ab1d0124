//! Structured outcome of an export run.

use super::{Bucket, ItemId};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;

pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Why a file or branch could not be exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SourceMissing,
    PermissionDenied,
    UnresolvedPath,
    CollisionExhausted,
    DirectoryCreate,
    MetadataRead,
    Io,
}

impl ErrorKind {
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ErrorKind::SourceMissing,
            io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::Io,
        }
    }
}

/// A recorded failure with enough context to diagnose it without re-running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub kind: ErrorKind,
    pub reason: String,
}

/// A successfully copied attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub item_id: ItemId,
    pub source: PathBuf,
    /// Path relative to the output root, `/`-separated.
    pub destination: String,
    pub bucket: Bucket,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReport {
    pub collections_visited: usize,
    pub collections_skipped: usize,
    pub items_exported: usize,
    pub files_copied: usize,
    pub files_skipped: usize,
    pub errors: usize,
    pub mask_lookups: usize,
    pub error_records: Vec<FileError>,
    pub exported: Vec<ExportedFile>,
}

impl ExportReport {
    pub fn record_error(&mut self, error: FileError) {
        self.errors += 1;
        self.error_records.push(error);
    }

    pub fn record_copy(&mut self, file: ExportedFile) {
        self.files_copied += 1;
        self.exported.push(file);
    }

    /// Fold a finished sub-report into this one.
    pub fn merge(&mut self, other: ExportReport) {
        self.collections_visited += other.collections_visited;
        self.collections_skipped += other.collections_skipped;
        self.items_exported += other.items_exported;
        self.files_copied += other.files_copied;
        self.files_skipped += other.files_skipped;
        self.errors += other.errors;
        self.mask_lookups += other.mask_lookups;
        self.error_records.extend(other.error_records);
        self.exported.extend(other.exported);
    }

    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}
