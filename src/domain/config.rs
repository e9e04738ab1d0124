//! Run configuration shared by the CLI and the request handler.

use super::Bucket;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TITLE_MAX_CHARS: usize = 150;
pub const DEFAULT_COLLISION_RETRY_LIMIT: usize = 1000;
pub const DEFAULT_OUTPUT_DIR: &str = "Zotero_Export";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Zotero data directory holding `zotero.sqlite` and `storage/`.
    pub zotero_data_dir: PathBuf,
    pub output_root: PathBuf,
    pub default_collection: Option<String>,
    /// Base directory for attachments stored as `attachments:<relative path>`.
    pub linked_attachment_base_dir: Option<PathBuf>,
    /// Read from a private copy of the database instead of the live file.
    pub snapshot_database: bool,
    pub title_max_chars: usize,
    pub collision_retry_limit: usize,
    /// Buckets to export; `None` exports every bucket.
    #[serde(deserialize_with = "deserialize_buckets")]
    pub buckets: Option<Vec<Bucket>>,
    pub parallel_copies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zotero_data_dir: default_zotero_data_dir(),
            output_root: PathBuf::from(DEFAULT_OUTPUT_DIR),
            default_collection: None,
            linked_attachment_base_dir: None,
            snapshot_database: true,
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
            collision_retry_limit: DEFAULT_COLLISION_RETRY_LIMIT,
            buckets: None,
            parallel_copies: true,
        }
    }
}

pub fn default_zotero_data_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join("Zotero")
}

/// Accept either `"PDF, Word"` or `["PDF", "Word"]`.
fn deserialize_buckets<'de, D>(deserializer: D) -> Result<Option<Vec<Bucket>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Csv(String),
        List(Vec<String>),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    let names = match raw {
        None => return Ok(None),
        Some(Raw::Csv(value)) => value.split(',').map(str::to_string).collect::<Vec<_>>(),
        Some(Raw::List(values)) => values,
    };

    let mut buckets = Vec::new();
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let bucket: Bucket = name.parse().map_err(serde::de::Error::custom)?;
        if !buckets.contains(&bucket) {
            buckets.push(bucket);
        }
    }
    Ok(Some(buckets))
}
