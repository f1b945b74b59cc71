// Contact endpoint handlers

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::response::{error_response, json_response};
use super::types::{Ack, ContactList};
use crate::config::AppState;
use crate::contact::{ContactRecord, ContactSubmission};
use crate::error::ContactError;
use crate::logger;

/// POST /api/contact
pub async fn submit_contact(
    body: &[u8],
    header_user_agent: Option<&str>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let submission = match ContactSubmission::from_json(body) {
        Ok(s) => s,
        Err(e) => return error_response(&e),
    };

    let record = ContactRecord::from_submission(
        submission,
        header_user_agent,
        &state.config.contact.default_source,
    );
    let source = record.source.clone();

    match state.writer.append(record).await {
        Ok(()) => {
            logger::log_contact_saved(&source);
            json_response(StatusCode::OK, &Ack::ok())
        }
        Err(e) => {
            log_storage_error("store contact", &e);
            error_response(&e)
        }
    }
}

/// GET /api/contacts
pub async fn list_contacts(state: &AppState) -> Response<Full<Bytes>> {
    match state.store.list().await {
        Ok(items) => json_response(
            StatusCode::OK,
            &ContactList {
                ok: true,
                items: &items,
            },
        ),
        Err(e) => {
            log_storage_error("list contacts", &e);
            error_response(&e)
        }
    }
}

fn log_storage_error(action: &str, error: &ContactError) {
    logger::log_error(&format!("Failed to {action}: {error}"));
}
