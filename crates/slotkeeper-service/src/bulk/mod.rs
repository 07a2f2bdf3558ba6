//! Bulk operations façade across chapters.

pub mod report;
pub mod service;

pub use report::{BulkError, BulkItem, BulkReport};
pub use service::{BulkAction, BulkOutcome, BulkService};
