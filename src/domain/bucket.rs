//! Type-based subfolders inside a collection directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of subfolders an attachment can be routed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bucket {
    #[serde(rename = "PDF", alias = "pdf")]
    Pdf,
    #[serde(rename = "Word", alias = "word")]
    Word,
    #[serde(rename = "Spreadsheet", alias = "spreadsheet")]
    Spreadsheet,
    #[serde(rename = "Presentation", alias = "presentation")]
    Presentation,
    #[serde(rename = "Image", alias = "image")]
    Image,
    #[serde(rename = "Ebook", alias = "ebook")]
    Ebook,
    #[serde(rename = "Other", alias = "other")]
    Other,
}

impl Bucket {
    pub const ALL: [Bucket; 7] = [
        Bucket::Pdf,
        Bucket::Word,
        Bucket::Spreadsheet,
        Bucket::Presentation,
        Bucket::Image,
        Bucket::Ebook,
        Bucket::Other,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Bucket::Pdf => "PDF",
            Bucket::Word => "Word",
            Bucket::Spreadsheet => "Spreadsheet",
            Bucket::Presentation => "Presentation",
            Bucket::Image => "Image",
            Bucket::Ebook => "Ebook",
            Bucket::Other => "Other",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Bucket::ALL
            .into_iter()
            .find(|b| b.dir_name().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                let names: Vec<&str> = Bucket::ALL.iter().map(|b| b.dir_name()).collect();
                format!("Unknown bucket '{value}'. Expected one of: {}", names.join(", "))
            })
    }
}
