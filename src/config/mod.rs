//! Configuration loading and merging
//!
//! Values come from `zotero-mirror.toml`/`.yml` files, then the environment
//! and command line (clap resolves those two), with CLI > Env > File > Defaults.

pub mod loader;
pub mod merge;

pub use loader::load_config;
pub use merge::{merge_cli_with_config, CliOverrides};
