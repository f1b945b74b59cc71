//! Contact record and submission types

use crate::error::{ContactError, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};

/// Header row of the contacts file, in column order
pub const CSV_HEADER: [&str; 6] = [
    "created",
    "name",
    "details",
    "message",
    "user_agent",
    "source",
];

/// One stored contact-form entry
///
/// Field names double as CSV column names and JSON keys in listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactRecord {
    pub created: String,
    pub name: String,
    pub details: String,
    pub message: String,
    pub user_agent: String,
    pub source: String,
}

impl ContactRecord {
    /// Build a record stamped with the current UTC time
    ///
    /// `meta.userAgent` wins over the request's `User-Agent` header;
    /// `meta.source` wins over `default_source`.
    pub fn from_submission(
        submission: ContactSubmission,
        header_user_agent: Option<&str>,
        default_source: &str,
    ) -> Self {
        let ContactSubmission {
            name,
            details,
            message,
            user_agent,
            source,
        } = submission;

        Self {
            created: timestamp_now(),
            name,
            details,
            message,
            user_agent: user_agent
                .or_else(|| header_user_agent.map(ToString::to_string))
                .unwrap_or_default(),
            source: source.unwrap_or_else(|| default_source.to_string()),
        }
    }

    /// Fields in [`CSV_HEADER`] order
    pub fn as_row(&self) -> [&str; 6] {
        [
            self.created.as_str(),
            self.name.as_str(),
            self.details.as_str(),
            self.message.as_str(),
            self.user_agent.as_str(),
            self.source.as_str(),
        ]
    }

    /// Build a record from raw CSV fields by position
    ///
    /// Missing trailing fields read as empty, extra fields are ignored and
    /// invalid UTF-8 is replaced rather than rejected.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut record = Self::default();
        for (index, raw) in fields.into_iter().enumerate() {
            let value = String::from_utf8_lossy(raw).into_owned();
            match index {
                0 => record.created = value,
                1 => record.name = value,
                2 => record.details = value,
                3 => record.message = value,
                4 => record.user_agent = value,
                5 => record.source = value,
                _ => break,
            }
        }
        record
    }
}

/// Naive UTC ISO-8601 timestamp with microseconds, e.g. `2024-05-01T09:30:00.123456`
pub fn timestamp_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// A validated contact submission extracted from a JSON request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub details: String,
    pub message: String,
    /// `meta.userAgent`, when present and non-empty
    pub user_agent: Option<String>,
    /// `meta.source`, when present and non-empty
    pub source: Option<String>,
}

impl ContactSubmission {
    /// Parse and validate a request body
    ///
    /// Bodies that are not JSON objects fail with `InvalidJson`. Required
    /// fields that are missing, `null`, non-string or blank after trimming
    /// fail with `MissingFields`.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).map_err(|_| ContactError::InvalidJson)?;
        let Value::Object(fields) = value else {
            return Err(ContactError::InvalidJson);
        };

        let name = required_text(&fields, "name");
        let details = required_text(&fields, "details");
        let message = required_text(&fields, "message");
        if name.is_empty() || details.is_empty() || message.is_empty() {
            return Err(ContactError::MissingFields);
        }

        let meta = fields.get("meta").and_then(Value::as_object);
        Ok(Self {
            name,
            details,
            message,
            user_agent: meta.and_then(|m| optional_text(m, "userAgent")),
            source: meta.and_then(|m| optional_text(m, "source")),
        })
    }
}

fn required_text(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

fn optional_text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
