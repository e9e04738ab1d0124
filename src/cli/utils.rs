//! Shared CLI utilities.

use crate::domain::Bucket;
use crate::mirror::MaskSelection;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

/// Parse `--buckets PDF,Word` into bucket values.
pub fn parse_buckets(value: &Option<String>) -> Result<Option<Vec<Bucket>>> {
    parse_csv(value)
        .map(|names| {
            names
                .iter()
                .map(|name| name.parse::<Bucket>().map_err(anyhow::Error::msg))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()
}

/// Read a mask file: a JSON object, `null`, or `"nothing"`.
pub fn load_mask(path: &Path) -> Result<MaskSelection> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed reading mask file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid mask file: {}", path.display()))
}
