// API module entry
// JSON endpoints for submitting and listing contacts

mod handlers;
mod response;
mod types;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::USER_AGENT;
use hyper::{Method, Request, Response};

use crate::config::AppState;
use crate::error::ContactError;
use crate::logger;

use response::error_response;

/// Every API route lives under this prefix
pub const API_PREFIX: &str = "/api/";
pub const CONTACT_PATH: &str = "/api/contact";
pub const CONTACTS_PATH: &str = "/api/contacts";

/// API route handler
///
/// Dispatches to handler functions based on request path and method
pub async fn handle_api<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::POST, CONTACT_PATH) => {
            let header_user_agent = req
                .headers()
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string);

            match read_body(req.into_body(), state.config.http.max_body_size).await {
                Ok(body) => {
                    handlers::submit_contact(&body, header_user_agent.as_deref(), state).await
                }
                Err(e) => error_response(&e),
            }
        }
        (Method::GET | Method::HEAD, CONTACTS_PATH) => handlers::list_contacts(state).await,
        (_, CONTACT_PATH) => response::method_not_allowed("POST, OPTIONS"),
        (_, CONTACTS_PATH) => response::method_not_allowed("GET, HEAD, OPTIONS"),
        _ => error_response(&ContactError::NotFound),
    }
}

/// Collect the request body, refusing anything over `limit` bytes
async fn read_body<B>(body: B, limit: u64) -> Result<Bytes, ContactError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max = usize::try_from(limit).unwrap_or(usize::MAX);
    match Limited::new(body, max).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(ContactError::PayloadTooLarge { limit })
        }
        Err(e) => {
            // an unreadable body cannot be JSON either
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(ContactError::InvalidJson)
        }
    }
}
