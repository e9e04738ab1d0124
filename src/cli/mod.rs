//! Command-line interface for zotero-mirror
//!
//! Provides `export`, `collections` and `request` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod collections;
mod export;
mod request;
mod utils;

/// Mirror Zotero collections onto plain directory trees
#[derive(Parser)]
#[command(name = "zotero-mirror")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a collection and its sub-collections to a directory tree
    Export(Box<export::ExportArgs>),

    /// Show the library's collection hierarchy
    Collections(collections::CollectionsArgs),

    /// Run an export described by a JSON request and print a JSON response
    Request(request::RequestArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Export(args) => export::run(*args),
        Commands::Collections(args) => collections::run(args),
        Commands::Request(args) => request::run(args),
    }
}
