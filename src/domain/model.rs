//! Library records read from the metadata database.
//!
//! Everything here is an immutable snapshot for a single export run.

use crate::utils::sanitize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub type CollectionId = i64;
pub type ItemId = i64;

/// Flat collection row as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub id: CollectionId,
    pub key: String,
    pub name: String,
    pub parent_id: Option<CollectionId>,
}

/// A collection with its owned sub-collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionNode {
    pub id: CollectionId,
    pub key: String,
    pub name: String,
    pub children: Vec<CollectionNode>,
}

impl CollectionNode {
    pub fn new(id: CollectionId, key: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id, key: key.into(), name: name.into(), children: Vec::new() }
    }

    pub fn with_children(mut self, children: Vec<CollectionNode>) -> Self {
        self.children = children;
        self
    }

    /// Directory name used for this collection in the mirror.
    pub fn dir_name(&self) -> String {
        sanitize(&self.name)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(CollectionNode::subtree_len).sum::<usize>()
    }
}

/// One creator of an item, in the item's creator order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub first_name: String,
    pub last_name: String,
    pub creator_type: String,
}

impl Creator {
    /// Surname, falling back to the single-field name some creators use.
    pub fn surname(&self) -> Option<&str> {
        [self.last_name.trim(), self.first_name.trim()].into_iter().find(|s| !s.is_empty())
    }
}

/// A bibliographic record and its attached files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub key: String,
    pub title: Option<String>,
    pub year: Option<String>,
    pub creators: Vec<Creator>,
    pub attachments: Vec<Attachment>,
}

impl Item {
    /// Surname of the first author, or of the first creator of any type.
    pub fn primary_surname(&self) -> Option<&str> {
        self.creators
            .iter()
            .filter(|c| c.creator_type.eq_ignore_ascii_case("author"))
            .chain(self.creators.iter())
            .find_map(Creator::surname)
    }
}

/// Where an attachment's bytes live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttachmentSource {
    /// Absolute path on disk (stored or linked file).
    Local(PathBuf),
    /// Path relative to the linked-attachment base directory, which is not configured.
    Unresolved(String),
    /// Web link or record without a local file.
    LinkOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: ItemId,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub source: AttachmentSource,
}

impl Attachment {
    /// Extension of the original file name, without the dot.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name.as_deref()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator(first: &str, last: &str, kind: &str) -> Creator {
        Creator {
            first_name: first.to_string(),
            last_name: last.to_string(),
            creator_type: kind.to_string(),
        }
    }

    fn item_with(creators: Vec<Creator>) -> Item {
        Item {
            id: 1,
            key: "ABCD1234".to_string(),
            title: None,
            year: None,
            creators,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn primary_surname_prefers_authors_over_editors() {
        let item = item_with(vec![
            creator("Ed", "Itor", "editor"),
            creator("Ada", "Lovelace", "author"),
        ]);
        assert_eq!(item.primary_surname(), Some("Lovelace"));
    }

    #[test]
    fn primary_surname_falls_back_to_first_creator() {
        let item = item_with(vec![creator("", "WHO", "contributor")]);
        assert_eq!(item.primary_surname(), Some("WHO"));
        assert_eq!(item_with(Vec::new()).primary_surname(), None);
    }

    #[test]
    fn attachment_extension_ignores_dotfiles() {
        let mut att = Attachment {
            id: 2,
            file_name: Some("paper.final.PDF".to_string()),
            content_type: None,
            source: AttachmentSource::LinkOnly,
        };
        assert_eq!(att.extension(), Some("PDF"));
        att.file_name = Some(".bashrc".to_string());
        assert_eq!(att.extension(), None);
        att.file_name = Some("README".to_string());
        assert_eq!(att.extension(), None);
    }

    #[test]
    fn subtree_len_counts_all_descendants() {
        let tree = CollectionNode::new(1, "A", "Root").with_children(vec![
            CollectionNode::new(2, "B", "Child")
                .with_children(vec![CollectionNode::new(3, "C", "Grandchild")]),
            CollectionNode::new(4, "D", "Other"),
        ]);
        assert_eq!(tree.subtree_len(), 4);
    }
}
