//! Shared helpers.

pub mod classify;
pub mod paths;
pub mod sanitize;

pub use classify::classify_attachment;
pub use paths::{expand_home, normalize_path, relative_display};
pub use sanitize::{sanitize, truncate_chars};
