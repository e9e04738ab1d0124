//! Collections command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::utils::load_mask;
use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::render::render_forest;
use crate::zotero::{build_forest, MetadataReader, ZoteroDb};

#[derive(Args)]
pub struct CollectionsArgs {
    /// Zotero data directory containing zotero.sqlite
    #[arg(short = 'z', long, value_name = "DIR", env = "ZOTERO_DATA_DIR")]
    pub zotero_data: Option<PathBuf>,

    /// Mark collections this JSON filter mask would skip
    #[arg(short, long, value_name = "FILE")]
    pub mask: Option<PathBuf>,

    /// Print the tree as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to config file (zotero-mirror.toml or zotero-mirror.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn run(args: CollectionsArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let file_config = load_config(&cwd, args.config.as_deref())?;
    let config = merge_cli_with_config(
        file_config,
        CliOverrides { zotero_data_dir: args.zotero_data.clone(), ..CliOverrides::default() },
    );

    let db = ZoteroDb::open(&config.zotero_data_dir, config.snapshot_database)
        .with_context(|| format!("Cannot open library in {}", config.zotero_data_dir.display()))?;
    let forest = build_forest(&db.collections()?);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&forest)?);
        return Ok(());
    }

    if forest.is_empty() {
        println!("No collections found.");
        return Ok(());
    }

    let mask = args.mask.as_deref().map(load_mask).transpose()?;
    let selected = mask.as_ref().and_then(|m| m.mask());
    println!("{}", render_forest(&forest, selected));
    Ok(())
}
