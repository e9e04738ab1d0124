//! Collection-to-directory export.
//!
//! [`run_export`] resolves the root collection, checks the output root, and
//! hands the subtree to [`MirrorEngine`]. Configuration problems surface as
//! [`ExportError`] before any file is written; per-file and per-branch
//! failures end up in the returned [`ExportReport`].

pub mod cancel;
pub mod collision;
pub mod copy;
pub mod engine;
pub mod error;
pub mod mask;
pub mod placement;
pub mod request;

pub use cancel::CancelToken;
pub use engine::MirrorEngine;
pub use error::ExportError;
pub use mask::{evaluate, FilterMask, Inclusion};
pub use placement::{base_name, plan_item, PlannedFile};
pub use request::{execute, ExportRequest, ExportResponse, MaskSelection};

use crate::domain::{
    Bucket, Config, ExportReport, DEFAULT_COLLISION_RETRY_LIMIT, DEFAULT_TITLE_MAX_CHARS,
};
use crate::zotero::{build_subtree, find_root, MetadataReader, ZoteroDb};
use std::fs;
use std::path::{Path, PathBuf};

/// Tunables for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub title_max_chars: usize,
    pub collision_retry_limit: usize,
    /// Buckets to export; `None` exports every bucket.
    pub buckets: Option<Vec<Bucket>>,
    pub parallel_copies: bool,
    pub snapshot_database: bool,
    pub linked_attachment_base_dir: Option<PathBuf>,
    pub cancel: CancelToken,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
            collision_retry_limit: DEFAULT_COLLISION_RETRY_LIMIT,
            buckets: None,
            parallel_copies: true,
            snapshot_database: true,
            linked_attachment_base_dir: None,
            cancel: CancelToken::new(),
        }
    }
}

impl ExportOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            title_max_chars: config.title_max_chars,
            collision_retry_limit: config.collision_retry_limit,
            buckets: config.buckets.clone(),
            parallel_copies: config.parallel_copies,
            snapshot_database: config.snapshot_database,
            linked_attachment_base_dir: config.linked_attachment_base_dir.clone(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn allows(&self, bucket: Bucket) -> bool {
        self.buckets.as_ref().map_or(true, |allowed| allowed.contains(&bucket))
    }
}

/// Export the collection named `root_collection` from the library in
/// `zotero_data_dir` into `output_root`.
///
/// `mask == None` exports the whole subtree.
pub fn run_export(
    root_collection: &str,
    mask: Option<&FilterMask>,
    output_root: &Path,
    zotero_data_dir: &Path,
    options: &ExportOptions,
) -> Result<ExportReport, ExportError> {
    let db = ZoteroDb::open(zotero_data_dir, options.snapshot_database)?
        .with_linked_base_dir(options.linked_attachment_base_dir.clone());
    export_from_reader(&db, root_collection, mask, output_root, options)
}

/// Same as [`run_export`] against any metadata source.
pub fn export_from_reader<R: MetadataReader + ?Sized>(
    reader: &R,
    root_collection: &str,
    mask: Option<&FilterMask>,
    output_root: &Path,
    options: &ExportOptions,
) -> Result<ExportReport, ExportError> {
    let records = reader.collections()?;
    let root_record = find_root(&records, root_collection)?;
    let root = build_subtree(&records, root_record.id)
        .ok_or_else(|| ExportError::SourceNotFound { query: root_collection.to_string() })?;

    ensure_writable(output_root)?;

    tracing::info!(
        "Exporting '{}' ({} collections) to {}",
        root.name,
        root.subtree_len(),
        output_root.display()
    );
    let report = MirrorEngine::new(reader, options, output_root).run(&root, mask)?;
    tracing::info!(
        "Copied {} files from {} items ({} errors)",
        report.files_copied,
        report.items_exported,
        report.errors
    );
    Ok(report)
}

fn ensure_writable(output_root: &Path) -> Result<(), ExportError> {
    let unwritable = |source| ExportError::OutputUnwritable { path: output_root.to_path_buf(), source };
    fs::create_dir_all(output_root).map_err(unwritable)?;
    tempfile::tempfile_in(output_root).map_err(unwritable)?;
    Ok(())
}
