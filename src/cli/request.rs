//! Request command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

use crate::config::load_config;
use crate::mirror::{execute, ExportOptions, ExportRequest, ExportResponse};

#[derive(Args)]
pub struct RequestArgs {
    /// JSON request file (reads stdin when omitted or '-')
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Path to config file supplying defaults for unset request fields
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Print the response JSON. Malformed requests are errors of the command
/// itself; export failures are reported in the response and exit non-zero.
pub fn run(args: RequestArgs) -> Result<()> {
    let raw = match args.file.as_deref() {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed reading request: {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("Failed reading request from stdin")?;
            buf
        }
    };
    let request: ExportRequest = serde_json::from_str(&raw).context("Invalid export request")?;

    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd, args.config.as_deref())?;
    let options = ExportOptions::from_config(&config);

    let response = execute(&request, &config, &options);
    println!("{}", serde_json::to_string_pretty(&response)?);

    if let ExportResponse::Error { error } = response {
        anyhow::bail!("Export failed ({})", error.kind);
    }
    Ok(())
}
