//! Errors that abort an export run before or during the walk.

use crate::zotero::ReaderError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No collection matches '{query}'")]
    SourceNotFound { query: String },

    #[error("Collection name '{query}' is ambiguous; candidates: {}", candidates.join(", "))]
    AmbiguousMatch { query: String, candidates: Vec<String> },

    #[error("Cannot read the Zotero database: {0}")]
    SourceUnreadable(#[from] ReaderError),

    #[error("Cannot write to output root {}: {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Export cancelled")]
    Cancelled,
}

impl ExportError {
    /// Stable identifier used in request/response payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::SourceNotFound { .. } => "SourceNotFound",
            ExportError::AmbiguousMatch { .. } => "AmbiguousMatch",
            ExportError::SourceUnreadable(_) => "SourceUnreadable",
            ExportError::OutputUnwritable { .. } => "OutputUnwritable",
            ExportError::Cancelled => "Cancelled",
        }
    }
}
