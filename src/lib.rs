//! zotero-mirror: export a Zotero collection and its sub-collections as a
//! plain directory tree, one folder per collection, with attachments renamed
//! from item metadata and sorted into type buckets.
//!
//! The entry point for library users is [`mirror::run_export`].

pub mod cli;
pub mod config;
pub mod domain;
pub mod mirror;
pub mod render;
pub mod utils;
pub mod zotero;
