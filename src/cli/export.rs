//! Export command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use super::utils::{load_mask, parse_buckets};
use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::domain::{Config, ExportReport};
use crate::mirror::{execute, CancelToken, ExportOptions, ExportRequest, ExportResponse, MaskSelection};
use crate::render::{write_report, ReportContext};

#[derive(Args)]
pub struct ExportArgs {
    /// Root collection to export (defaults to `default_collection` from the config)
    #[arg(value_name = "COLLECTION", env = "DEFAULT_COLLECTION")]
    pub collection: Option<String>,

    /// Directory the collection tree is mirrored into
    #[arg(short, long, value_name = "DIR", env = "EXPORT_OUTPUT_ROOT")]
    pub out: Option<PathBuf>,

    /// Zotero data directory containing zotero.sqlite and storage/
    #[arg(short = 'z', long, value_name = "DIR", env = "ZOTERO_DATA_DIR")]
    pub zotero_data: Option<PathBuf>,

    /// JSON filter mask: nested object of sub-collection names, or "nothing"
    #[arg(short, long, value_name = "FILE")]
    pub mask: Option<PathBuf>,

    /// Path to config file (zotero-mirror.toml or zotero-mirror.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Export only these buckets (comma-separated, e.g. 'PDF,Word')
    #[arg(short = 'b', long, value_name = "BUCKETS")]
    pub buckets: Option<String>,

    /// Base directory for attachments linked relative to Zotero's base directory
    #[arg(long, value_name = "DIR")]
    pub linked_base_dir: Option<PathBuf>,

    /// Write a JSON report of the run to this file
    #[arg(short, long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Include a generation timestamp in the report
    #[arg(long)]
    pub timestamp: bool,

    /// Read the live database instead of a temporary copy
    #[arg(long)]
    pub no_snapshot: bool,

    /// Copy files one at a time
    #[arg(long)]
    pub sequential: bool,
}

pub fn run(args: ExportArgs) -> Result<()> {
    let start_time = Instant::now();

    let cwd = std::env::current_dir()?;
    let file_config = load_config(&cwd, args.config.as_deref())?;

    let cli_overrides = CliOverrides {
        zotero_data_dir: args.zotero_data.clone(),
        output_root: args.out.clone(),
        default_collection: args.collection.clone(),
        linked_attachment_base_dir: args.linked_base_dir.clone(),
        snapshot_database: if args.no_snapshot { Some(false) } else { None },
        parallel_copies: if args.sequential { Some(false) } else { None },
        buckets: parse_buckets(&args.buckets)?,
    };
    let config = merge_cli_with_config(file_config, cli_overrides);

    let Some(collection) = config.default_collection.clone() else {
        anyhow::bail!(
            "No collection given: pass COLLECTION, set DEFAULT_COLLECTION, or set default_collection in the config"
        );
    };
    let mask = match args.mask.as_deref() {
        Some(path) => load_mask(path)?,
        None => MaskSelection::All,
    };

    print_config(&config, &collection, &mask);

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || handler_token.cancel()) {
        tracing::warn!("Could not install Ctrl-C handler: {err}");
    }
    let options = ExportOptions::from_config(&config).with_cancel(cancel);

    let request = ExportRequest {
        root_collection: collection.clone(),
        mask,
        output_root: None,
        zotero_data_dir: None,
    };
    let report = match execute(&request, &config, &options) {
        ExportResponse::Success { report } => report,
        ExportResponse::Error { error } => {
            anyhow::bail!("{} ({})", error.message, error.kind);
        }
    };

    if let Some(report_path) = args.report.as_deref() {
        let ctx = ReportContext {
            root_collection: &collection,
            output_root: &config.output_root,
            include_timestamp: args.timestamp,
        };
        write_report(report_path, &report, &ctx)
            .with_context(|| format!("Failed writing report: {}", report_path.display()))?;
    }

    print_summary(&report, &config, start_time.elapsed().as_secs_f64());
    if let Some(report_path) = args.report.as_deref() {
        println!();
        println!("Report: {}", report_path.display());
    }
    Ok(())
}

fn print_config(config: &Config, collection: &str, mask: &MaskSelection) {
    let mask_label = match mask {
        MaskSelection::All => "none (full export)".to_string(),
        MaskSelection::Nothing => "nothing selected".to_string(),
        MaskSelection::Only(mask) => {
            format!("{} top-level entries", mask.len())
        }
    };
    let buckets = match &config.buckets {
        Some(buckets) => buckets.iter().map(|b| b.dir_name()).collect::<Vec<_>>().join(", "),
        None => "all".to_string(),
    };

    println!("Configuration:");
    println!("  Collection:      {collection}");
    println!("  Zotero data:     {}", config.zotero_data_dir.display());
    println!("  Output root:     {}", config.output_root.display());
    println!("  Mask:            {mask_label}");
    println!("  Buckets:         {buckets}");
    println!("  Snapshot:        {}", if config.snapshot_database { "yes" } else { "no" });
    println!("  Parallel copies: {}", if config.parallel_copies { "yes" } else { "no" });
    println!();
}

fn print_summary(report: &ExportReport, config: &Config, seconds: f64) {
    println!("Export complete!");
    println!();
    println!("Statistics:");
    println!("  Output root:         {}", config.output_root.display());
    println!("  Collections visited: {}", report.collections_visited);
    println!("  Collections skipped: {}", report.collections_skipped);
    println!("  Items exported:      {}", report.items_exported);
    println!("  Files copied:        {}", report.files_copied);
    println!("  Files skipped:       {}", report.files_skipped);
    println!("  Errors:              {}", report.errors);
    println!("  Processing time:     {seconds:.2}s");

    if !report.error_records.is_empty() {
        println!();
        println!("Errors:");
        for record in report.error_records.iter().take(10) {
            let path = record
                .source
                .as_ref()
                .or(record.destination.as_ref())
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("  {path}: {}", record.reason);
        }
        if report.error_records.len() > 10 {
            println!("  ... and {} more (see report)", report.error_records.len() - 10);
        }
    }
}
