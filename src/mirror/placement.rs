//! Semantic file names and type buckets for attachments.

use crate::domain::{Attachment, AttachmentSource, Bucket, Item};
use crate::utils::{classify_attachment, sanitize, truncate_chars};
use std::collections::HashMap;

pub const UNDATED: &str = "n.d.";
pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const UNTITLED: &str = "Untitled";

/// Upper bound on a generated file name in bytes; most filesystems cap at 255.
const MAX_NAME_BYTES: usize = 240;

/// Where one attachment goes inside its collection directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile<'a> {
    pub attachment: &'a Attachment,
    pub bucket: Bucket,
    pub file_name: String,
}

impl PlannedFile<'_> {
    /// `<bucket>/<file name>` relative to the collection directory.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.bucket.dir_name(), self.file_name)
    }
}

/// `[<year>] <surname> - <title>` before any suffix or extension.
pub fn base_name(item: &Item, title_max_chars: usize) -> String {
    let year = item.year.as_deref().map(str::trim).filter(|y| !y.is_empty()).unwrap_or(UNDATED);
    let surname = item.primary_surname().map(sanitize).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let title = item
        .title
        .as_deref()
        .map(sanitize)
        .unwrap_or_else(|| UNTITLED.to_string());
    let title = truncate_chars(&title, title_max_chars).trim_end().to_string();

    sanitize(&format!("[{year}] {surname} - {title}"))
}

/// Plan file names for every attachment of `item` that has a file.
///
/// Link-only attachments are left out. When one item has several files in
/// the same bucket, the second and later get `-2`, `-3`, ... in attachment
/// order.
pub fn plan_item(item: &Item, title_max_chars: usize) -> Vec<PlannedFile<'_>> {
    let base = base_name(item, title_max_chars);
    let mut seen: HashMap<Bucket, usize> = HashMap::new();
    let mut planned = Vec::new();

    for attachment in &item.attachments {
        if attachment.source == AttachmentSource::LinkOnly {
            continue;
        }

        let extension = attachment.extension().map(sanitize_extension);
        let bucket = classify_attachment(extension.as_deref(), attachment.content_type.as_deref());

        let count = seen.entry(bucket).or_insert(0);
        *count += 1;
        let suffix = if *count > 1 { format!("-{count}") } else { String::new() };

        let file_name = compose_file_name(&base, &suffix, extension.as_deref());
        planned.push(PlannedFile { attachment, bucket, file_name });
    }

    planned
}

fn sanitize_extension(ext: &str) -> String {
    sanitize(ext).replace('.', "_")
}

/// Join base, suffix and extension, shortening the base if the name would
/// exceed [`MAX_NAME_BYTES`].
fn compose_file_name(base: &str, suffix: &str, extension: Option<&str>) -> String {
    let tail = match extension {
        Some(ext) => format!("{suffix}.{ext}"),
        None => suffix.to_string(),
    };

    let mut base = base;
    while !base.is_empty() && base.len() + tail.len() > MAX_NAME_BYTES {
        let keep = base.chars().count().saturating_sub(1);
        base = truncate_chars(base, keep).trim_end();
    }
    format!("{base}{tail}")
}
