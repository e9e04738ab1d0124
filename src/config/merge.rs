//! Overlay command-line values on top of the file config.

use crate::domain::{Bucket, Config};
use crate::utils::expand_home;
use std::path::PathBuf;

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub zotero_data_dir: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub default_collection: Option<String>,
    pub linked_attachment_base_dir: Option<PathBuf>,
    pub snapshot_database: Option<bool>,
    pub parallel_copies: Option<bool>,
    pub buckets: Option<Vec<Bucket>>,
}

pub fn merge_cli_with_config(mut config: Config, cli: CliOverrides) -> Config {
    if let Some(dir) = cli.zotero_data_dir {
        config.zotero_data_dir = dir;
    }
    if let Some(dir) = cli.output_root {
        config.output_root = dir;
    }
    if let Some(name) = cli.default_collection.filter(|n| !n.trim().is_empty()) {
        config.default_collection = Some(name);
    }
    if let Some(dir) = cli.linked_attachment_base_dir {
        config.linked_attachment_base_dir = Some(dir);
    }
    if let Some(snapshot) = cli.snapshot_database {
        config.snapshot_database = snapshot;
    }
    if let Some(parallel) = cli.parallel_copies {
        config.parallel_copies = parallel;
    }
    if let Some(buckets) = cli.buckets {
        config.buckets = Some(buckets);
    }

    config.zotero_data_dir = expand_home(&config.zotero_data_dir);
    config.output_root = expand_home(&config.output_root);
    config.linked_attachment_base_dir =
        config.linked_attachment_base_dir.as_deref().map(expand_home);
    config
}
