//! Depth-first walk of a collection tree onto the output directory.

use super::collision::WriteSet;
use super::copy::copy_atomic;
use super::mask::{evaluate, FilterMask, Inclusion};
use super::placement::plan_item;
use super::{ExportError, ExportOptions};
use crate::domain::{
    AttachmentSource, Bucket, CollectionNode, ErrorKind, ExportReport, ExportedFile, FileError,
    ItemId,
};
use crate::utils::relative_display;
use crate::zotero::MetadataReader;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// How the children of a node are filtered.
#[derive(Debug, Clone, Copy)]
enum Scope<'m> {
    /// Everything below is exported; no mask lookups.
    Full,
    /// Each child is looked up in this mask level.
    Filtered(&'m FilterMask),
}

/// A copy whose destination has already been claimed in the write-set.
#[derive(Debug)]
struct CopyJob {
    item_id: ItemId,
    bucket: Bucket,
    source: PathBuf,
    destination: PathBuf,
}

/// Mirrors one collection subtree. The write-set lives for a single run.
pub struct MirrorEngine<'a, R: MetadataReader + ?Sized> {
    reader: &'a R,
    options: &'a ExportOptions,
    output_root: PathBuf,
    write_set: WriteSet,
}

impl<'a, R: MetadataReader + ?Sized> MirrorEngine<'a, R> {
    pub fn new(reader: &'a R, options: &'a ExportOptions, output_root: &Path) -> Self {
        Self {
            reader,
            options,
            output_root: output_root.to_path_buf(),
            write_set: WriteSet::new(options.collision_retry_limit),
        }
    }

    /// Export `root` into the output root itself, filtering its children
    /// through `mask`.
    pub fn run(
        mut self,
        root: &CollectionNode,
        mask: Option<&FilterMask>,
    ) -> Result<ExportReport, ExportError> {
        let scope = match mask {
            Some(mask) if !mask.is_full() => Scope::Filtered(mask),
            _ => Scope::Full,
        };
        let root_dir = self.output_root.clone();
        self.visit(root, &root_dir, scope)
    }

    fn visit(
        &mut self,
        node: &CollectionNode,
        dir: &Path,
        scope: Scope<'_>,
    ) -> Result<ExportReport, ExportError> {
        if self.options.cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }

        let mut report = ExportReport { collections_visited: 1, ..Default::default() };
        tracing::info!("Exporting collection '{}' -> {}", node.name, dir.display());

        let items = match self.reader.collection_items(node.id) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!("Skipping collection '{}': {}", node.name, err);
                report.record_error(FileError {
                    source: None,
                    destination: Some(dir.to_path_buf()),
                    kind: ErrorKind::MetadataRead,
                    reason: err.to_string(),
                });
                return Ok(report);
            }
        };

        if let Err(err) = fs::create_dir_all(dir) {
            tracing::warn!("Cannot create {}: {}", dir.display(), err);
            report.record_error(FileError {
                source: None,
                destination: Some(dir.to_path_buf()),
                kind: ErrorKind::DirectoryCreate,
                reason: err.to_string(),
            });
            return Ok(report);
        }

        let mut jobs = Vec::new();
        for item in &items {
            report.files_skipped += item
                .attachments
                .iter()
                .filter(|a| a.source == AttachmentSource::LinkOnly)
                .count();

            for planned in plan_item(item, self.options.title_max_chars) {
                if !self.options.allows(planned.bucket) {
                    report.files_skipped += 1;
                    continue;
                }

                let intended = dir.join(planned.bucket.dir_name()).join(&planned.file_name);
                let source = match &planned.attachment.source {
                    AttachmentSource::Local(path) => path,
                    AttachmentSource::Unresolved(raw) => {
                        report.record_error(FileError {
                            source: Some(PathBuf::from(raw)),
                            destination: Some(intended),
                            kind: ErrorKind::UnresolvedPath,
                            reason: "relative attachment path without a linked attachment base directory"
                                .to_string(),
                        });
                        continue;
                    }
                    AttachmentSource::LinkOnly => continue,
                };

                if !source.is_file() {
                    tracing::warn!("Attachment missing on disk: {}", source.display());
                    report.record_error(FileError {
                        source: Some(source.clone()),
                        destination: Some(intended),
                        kind: ErrorKind::SourceMissing,
                        reason: "source file does not exist".to_string(),
                    });
                    continue;
                }

                let bucket_dir = dir.join(planned.bucket.dir_name());
                match self.write_set.claim(&bucket_dir, &planned.file_name) {
                    Ok(destination) => jobs.push(CopyJob {
                        item_id: item.id,
                        bucket: planned.bucket,
                        source: source.clone(),
                        destination,
                    }),
                    Err(err) => report.record_error(FileError {
                        source: Some(source.clone()),
                        destination: Some(intended),
                        kind: ErrorKind::CollisionExhausted,
                        reason: err.to_string(),
                    }),
                }
            }
        }

        self.run_copies(jobs, &mut report);

        for child in &node.children {
            let child_scope = match scope {
                Scope::Full => Scope::Full,
                Scope::Filtered(mask) => {
                    report.mask_lookups += 1;
                    match evaluate(Some(mask), &child.dir_name()) {
                        Inclusion::Excluded => {
                            tracing::debug!("Pruned collection '{}'", child.name);
                            report.collections_skipped += child.subtree_len();
                            continue;
                        }
                        Inclusion::Full => Scope::Full,
                        Inclusion::Partial(nested) => Scope::Filtered(nested),
                    }
                }
            };

            let child_dir = dir.join(child.dir_name());
            let sub = self.visit(child, &child_dir, child_scope)?;
            report.merge(sub);
        }

        Ok(report)
    }

    /// Copy every claimed file, in parallel when enabled, and record outcomes
    /// in planning order.
    fn run_copies(&self, jobs: Vec<CopyJob>, report: &mut ExportReport) {
        let copy = |job: CopyJob| {
            let outcome = copy_atomic(&job.source, &job.destination);
            (job, outcome)
        };
        let outcomes: Vec<_> = if self.options.parallel_copies {
            jobs.into_par_iter().map(copy).collect()
        } else {
            jobs.into_iter().map(copy).collect()
        };

        let mut exported_items = BTreeSet::new();
        for (job, outcome) in outcomes {
            match outcome {
                Ok(bytes) => {
                    tracing::debug!("Copied {} bytes to {}", bytes, job.destination.display());
                    exported_items.insert(job.item_id);
                    report.record_copy(ExportedFile {
                        item_id: job.item_id,
                        destination: relative_display(&job.destination, &self.output_root),
                        source: job.source,
                        bucket: job.bucket,
                    });
                }
                Err(err) => {
                    tracing::warn!("Failed to copy {}: {}", job.source.display(), err);
                    report.record_error(FileError {
                        kind: err.kind(),
                        reason: err.to_string(),
                        source: Some(job.source),
                        destination: Some(job.destination),
                    });
                }
            }
        }
        report.items_exported += exported_items.len();
    }
}
