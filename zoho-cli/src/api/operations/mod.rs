//! Zoho CRM bulk update operations
//!
//! This module provides the row/result types of a bulk field update and the
//! chunked updater that executes it.

pub mod bulk;
pub mod operation;

pub use bulk::{BulkUpdater, ChunkObserver, ChunkProgress};
pub use operation::{UpdateResult, UpdateRow, UpdateTarget};
