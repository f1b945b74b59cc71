//! Error taxonomy for the contact service
//!
//! Every failure a request can hit maps to an HTTP status and a stable
//! machine-readable code that is returned in the JSON `error` field.

use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContactError {
    /// Request body could not be parsed as a JSON object
    #[error("request body is not valid JSON")]
    InvalidJson,

    /// One of name/details/message is empty after trimming
    #[error("name, details and message are required")]
    MissingFields,

    /// Requested static asset does not exist
    #[error("resource not found")]
    NotFound,

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("storage I/O error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The single writer task has stopped accepting records
    #[error("contact writer is no longer running")]
    WriterClosed,
}

impl ContactError {
    /// Error code surfaced in API responses
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson => "invalid_json",
            Self::MissingFields => "missing_fields",
            Self::NotFound => "not_found",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::Storage(_) | Self::Csv(_) | Self::WriterClosed => "storage_error",
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson | Self::MissingFields => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage(_) | Self::Csv(_) | Self::WriterClosed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ContactError>;
