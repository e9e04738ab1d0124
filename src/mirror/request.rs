//! JSON request/response contract for callers outside the CLI.

use super::{run_export, ExportError, ExportOptions, FilterMask};
use crate::domain::{Config, ExportReport};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Sentinel a caller sends when the user selected no collections at all.
pub const NOTHING_SENTINEL: &str = "nothing";

/// The caller's resolved selection.
///
/// An empty mask object still means "everything below here"; a caller that
/// wants to export nothing says so with [`NOTHING_SENTINEL`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MaskSelection {
    #[default]
    All,
    Only(FilterMask),
    Nothing,
}

impl MaskSelection {
    pub fn mask(&self) -> Option<&FilterMask> {
        match self {
            MaskSelection::Only(mask) => Some(mask),
            MaskSelection::All | MaskSelection::Nothing => None,
        }
    }
}

impl<'de> Deserialize<'de> for MaskSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Sentinel(String),
            Mask(FilterMask),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(MaskSelection::All),
            Some(Raw::Mask(mask)) => Ok(MaskSelection::Only(mask)),
            Some(Raw::Sentinel(s)) if s == NOTHING_SENTINEL => Ok(MaskSelection::Nothing),
            Some(Raw::Sentinel(other)) => {
                Err(D::Error::custom(format!("unknown mask value '{other}'")))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    pub root_collection: String,
    #[serde(default)]
    pub mask: MaskSelection,
    pub output_root: Option<PathBuf>,
    pub zotero_data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportResponse {
    Success { report: ExportReport },
    Error { error: ResponseError },
}

impl From<Result<ExportReport, ExportError>> for ExportResponse {
    fn from(result: Result<ExportReport, ExportError>) -> Self {
        match result {
            Ok(report) => ExportResponse::Success { report },
            Err(err) => ExportResponse::Error {
                error: ResponseError { kind: err.kind().to_string(), message: err.to_string() },
            },
        }
    }
}

/// Run `request`, filling unset paths from `config`.
pub fn execute(request: &ExportRequest, config: &Config, options: &ExportOptions) -> ExportResponse {
    if request.mask == MaskSelection::Nothing {
        tracing::info!("Empty selection for '{}'; nothing to export", request.root_collection);
        return ExportResponse::Success { report: ExportReport::default() };
    }

    let output_root = request.output_root.as_ref().unwrap_or(&config.output_root);
    let data_dir = request.zotero_data_dir.as_ref().unwrap_or(&config.zotero_data_dir);
    run_export(&request.root_collection, request.mask.mask(), output_root, data_dir, options).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zotero::fixture::{ItemSpec, LibraryFixture};
    use serde_json::json;
    use tempfile::TempDir;

    fn parse(value: serde_json::Value) -> ExportRequest {
        serde_json::from_value(value).expect("request")
    }

    #[test]
    fn mask_forms() {
        assert_eq!(parse(json!({"root_collection": "P"})).mask, MaskSelection::All);
        assert_eq!(parse(json!({"root_collection": "P", "mask": null})).mask, MaskSelection::All);
        assert_eq!(
            parse(json!({"root_collection": "P", "mask": "nothing"})).mask,
            MaskSelection::Nothing
        );
        match parse(json!({"root_collection": "P", "mask": {"AI": {}}})).mask {
            MaskSelection::Only(mask) => assert_eq!(mask.keys().collect::<Vec<_>>(), vec!["AI"]),
            other => panic!("expected a mask, got {other:?}"),
        }
    }

    #[test]
    fn empty_mask_object_is_not_nothing() {
        let request = parse(json!({"root_collection": "P", "mask": {}}));
        let mask = request.mask.mask().expect("mask");
        assert!(mask.is_full());
    }

    #[test]
    fn unknown_sentinel_is_rejected() {
        let err = serde_json::from_value::<ExportRequest>(json!({"root_collection": "P", "mask": "all"}))
            .expect_err("bad sentinel");
        assert!(err.to_string().contains("unknown mask value"));
    }

    #[test]
    fn nothing_skips_the_engine() {
        let out = TempDir::new().expect("out");
        let request = ExportRequest {
            root_collection: "Missing".to_string(),
            mask: MaskSelection::Nothing,
            output_root: Some(out.path().join("export")),
            zotero_data_dir: Some(out.path().join("no-library")),
        };

        let response = execute(&request, &Config::default(), &ExportOptions::default());
        assert_eq!(response, ExportResponse::Success { report: ExportReport::default() });
        assert!(!out.path().join("export").exists());
    }

    #[test]
    fn errors_carry_kind_and_message() {
        let data = TempDir::new().expect("data");
        let out = TempDir::new().expect("out");
        let mut lib = LibraryFixture::create(data.path()).expect("fixture");
        let papers = lib.add_collection("Papers", None).expect("papers");
        lib.add_item(papers, ItemSpec { title: Some("T"), ..Default::default() }).expect("item");

        let request = ExportRequest {
            root_collection: "Theses".to_string(),
            mask: MaskSelection::All,
            output_root: Some(out.path().to_path_buf()),
            zotero_data_dir: Some(data.path().to_path_buf()),
        };
        let response = execute(&request, &Config::default(), &ExportOptions::default());

        let value = serde_json::to_value(&response).expect("json");
        assert_eq!(value["status"], json!("error"));
        assert_eq!(value["error"]["kind"], json!("SourceNotFound"));
        assert!(value["error"]["message"].as_str().is_some_and(|m| m.contains("Theses")));
    }

    #[test]
    fn success_wraps_the_report() {
        let data = TempDir::new().expect("data");
        let out = TempDir::new().expect("out");
        let mut lib = LibraryFixture::create(data.path()).expect("fixture");
        let papers = lib.add_collection("Papers", None).expect("papers");
        let item = lib
            .add_item(papers, ItemSpec { title: Some("T"), date: Some("2001"), ..Default::default() })
            .expect("item");
        lib.add_stored_attachment(item, "t.pdf", b"pdf").expect("attachment");

        let request = parse(json!({
            "root_collection": "papers",
            "output_root": out.path(),
            "zotero_data_dir": data.path(),
        }));
        let response = execute(&request, &Config::default(), &ExportOptions::default());

        let value = serde_json::to_value(&response).expect("json");
        assert_eq!(value["status"], json!("success"));
        assert_eq!(value["report"]["files_copied"], json!(1));
        assert!(out.path().join("PDF/[2001] Unknown - T.pdf").is_file());
    }
}
