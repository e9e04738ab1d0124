//! Core data types shared across the crate.

mod bucket;
mod config;
mod model;
mod report;

pub use bucket::Bucket;
pub use config::{
    default_zotero_data_dir, Config, DEFAULT_COLLISION_RETRY_LIMIT, DEFAULT_OUTPUT_DIR,
    DEFAULT_TITLE_MAX_CHARS,
};
pub use model::{
    Attachment, AttachmentSource, CollectionId, CollectionNode, CollectionRecord, Creator, Item,
    ItemId,
};
pub use report::{ErrorKind, ExportReport, ExportedFile, FileError, REPORT_SCHEMA_VERSION};
