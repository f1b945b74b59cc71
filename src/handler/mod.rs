//! Request handler module
//!
//! Routes requests to the contact API or the static frontend.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
