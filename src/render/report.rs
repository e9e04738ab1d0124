//! Report JSON generation.

use crate::domain::{ExportReport, REPORT_SCHEMA_VERSION};
use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::path::Path;

/// Run context written next to the counters.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub root_collection: &'a str,
    pub output_root: &'a Path,
    pub include_timestamp: bool,
}

pub fn report_value(report: &ExportReport, ctx: &ReportContext<'_>) -> Result<Value> {
    let mut exported: Vec<_> = report.exported.iter().collect();
    exported.sort_by(|a, b| a.destination.cmp(&b.destination));

    let mut value = Map::new();
    value.insert("schema_version".to_string(), Value::String(REPORT_SCHEMA_VERSION.to_string()));
    if ctx.include_timestamp {
        value.insert(
            "generated_at".to_string(),
            Value::String(Utc::now().format("%Y-%m-%dT%H:%M:%S+00:00").to_string()),
        );
    }
    value.insert("root_collection".to_string(), Value::String(ctx.root_collection.to_string()));
    value.insert(
        "output_root".to_string(),
        Value::String(ctx.output_root.to_string_lossy().into_owned()),
    );
    value.insert(
        "stats".to_string(),
        json!({
            "collections_visited": report.collections_visited,
            "collections_skipped": report.collections_skipped,
            "items_exported": report.items_exported,
            "files_copied": report.files_copied,
            "files_skipped": report.files_skipped,
            "errors": report.errors,
            "mask_lookups": report.mask_lookups,
        }),
    );
    value.insert("errors".to_string(), serde_json::to_value(&report.error_records)?);
    if !exported.is_empty() {
        value.insert("files".to_string(), serde_json::to_value(exported)?);
    }
    Ok(Value::Object(value))
}

pub fn write_report(report_path: &Path, report: &ExportReport, ctx: &ReportContext<'_>) -> Result<()> {
    let value = report_value(report, ctx)?;
    if let Some(parent) = report_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(report_path, serde_json::to_string_pretty(&value)?)?;
    Ok(())
}
