//! Output rendering (collection trees, reports)

pub mod report;
pub mod tree;

pub use report::{report_value, write_report, ReportContext};
pub use tree::render_forest;
