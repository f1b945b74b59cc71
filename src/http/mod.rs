//! HTTP protocol layer module
//!
//! Response builders, content type detection and `ETag` handling,
//! independent of the contact endpoints that use them.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    apply_common_headers, build_304_response, build_404_response, build_405_response,
    build_413_response, build_html_response, build_options_response, build_static_response,
};
