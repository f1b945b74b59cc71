//! Contact domain module
//!
//! - `record`: the persisted [`ContactRecord`] and the submission parsed from requests
//! - `store`: append-only CSV file access
//! - `writer`: the single task that serializes all appends

pub mod record;
pub mod store;
pub mod writer;

pub use record::{ContactRecord, ContactSubmission};
pub use store::ContactStore;
pub use writer::WriterHandle;
