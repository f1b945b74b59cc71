//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method and size checks, then
//! dispatch to the API or the static frontend. Adds common headers and
//! writes the access log line on the way out.

use crate::api;
use crate::config::AppState;
use crate::handler::static_files::{self, RequestContext};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, IF_NONE_MATCH};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let mut access = state
        .config
        .logging
        .access_log
        .then(|| AccessLogEntry::from_request(&req, remote_addr));

    let mut response = route_request(req, &state).await;
    http::apply_common_headers(&mut response, &state.config.http);

    if let Some(entry) = access.as_mut() {
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.finish(response.status().as_u16(), body_bytes, started.elapsed());
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on method and path
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    // 1. CORS preflight
    if req.method() == Method::OPTIONS {
        return http::build_options_response(state.config.http.enable_cors);
    }

    // 2. Declared body size
    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return resp;
    }

    // 3. API routes
    if req.uri().path().starts_with(api::API_PREFIX) {
        return api::handle_api(req, state).await;
    }

    // 4. Static frontend, read-only
    let is_head = match *req.method() {
        Method::GET => false,
        Method::HEAD => true,
        ref other => {
            logger::log_warning(&format!("Method not allowed: {other} {}", req.uri().path()));
            return http::build_405_response("GET, HEAD, OPTIONS");
        }
    };

    let ctx = RequestContext {
        path: req.uri().path(),
        is_head,
        if_none_match: req
            .headers()
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };

    if ctx.path == "/" {
        static_files::serve_root(&ctx, &state.config.frontend).await
    } else {
        static_files::serve_asset(&ctx, &state.config.frontend).await
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };

    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::contact::{self, ContactStore};
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use serde_json::Value;
    use std::path::Path;

    struct Reply {
        status: StatusCode,
        headers: hyper::HeaderMap,
        body: Bytes,
    }

    impl Reply {
        fn json(&self) -> Value {
            serde_json::from_slice(&self.body).unwrap()
        }
    }

    fn test_state(dir: &Path) -> Arc<AppState> {
        let mut cfg = Config::load_from("/nonexistent/contact-service-config").unwrap();
        cfg.storage.contacts_file = dir.join("contacts.csv").display().to_string();
        cfg.frontend.dir = dir.join("frontend").display().to_string();
        cfg.logging.access_log = false;

        let store = ContactStore::new(&cfg.storage.contacts_file);
        let (writer, _task) = contact::writer::spawn(store.clone(), 8);
        Arc::new(AppState::new(cfg, store, writer))
    }

    async fn send(state: &Arc<AppState>, req: Request<Full<Bytes>>) -> Reply {
        let response = handle_request(req, Arc::clone(state), "127.0.0.1:50000".parse().unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        Reply {
            status,
            headers,
            body,
        }
    }

    async fn get(state: &Arc<AppState>, uri: &str) -> Reply {
        let req = Request::get(uri).body(Full::new(Bytes::new())).unwrap();
        send(state, req).await
    }

    async fn post_contact(state: &Arc<AppState>, body: &'static str) -> Reply {
        let req = Request::post("/api/contact")
            .header("content-type", "application/json")
            .header("user-agent", "test-client/1.0")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap();
        send(state, req).await
    }

    #[tokio::test]
    async fn test_submit_then_list_adds_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let before = get(&state, "/api/contacts").await.json();
        assert_eq!(before["items"].as_array().unwrap().len(), 0);

        let reply = post_contact(
            &state,
            r#"{"name":" Ada Lovelace ","details":"ada@example.com","message":"Need a quote"}"#,
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json(), serde_json::json!({"ok": true}));

        let after = get(&state, "/api/contacts").await;
        assert_eq!(after.status, StatusCode::OK);
        let after = after.json();
        assert_eq!(after["ok"], true);
        let items = after["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Ada Lovelace");
        assert_eq!(items[0]["details"], "ada@example.com");
        assert_eq!(items[0]["message"], "Need a quote");
        assert_eq!(items[0]["user_agent"], "test-client/1.0");
        assert_eq!(items[0]["source"], "techpro-spa");
        assert!(!items[0]["created"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_meta_overrides_header_and_default_source() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        post_contact(
            &state,
            r#"{"name":"a","details":"b","message":"c","meta":{"userAgent":"spa/2","source":"pricing"}}"#,
        )
        .await;

        let items = get(&state, "/api/contacts").await.json()["items"].clone();
        assert_eq!(items[0]["user_agent"], "spa/2");
        assert_eq!(items[0]["source"], "pricing");
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected_without_append() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let reply = post_contact(&state, r#"{"name":"","details":"d","message":"m"}"#).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            reply.json(),
            serde_json::json!({"ok": false, "error": "missing_fields"})
        );

        let items = get(&state, "/api/contacts").await.json();
        assert_eq!(items["items"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_non_json_body_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let reply = post_contact(&state, "name=Ada&details=d&message=m").await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            reply.json(),
            serde_json::json!({"ok": false, "error": "invalid_json"})
        );
    }

    #[tokio::test]
    async fn test_list_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());
        let file = dir.path().join("contacts.csv");
        assert!(!file.exists());

        let reply = get(&state, "/api/contacts").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json(), serde_json::json!({"ok": true, "items": []}));
        // only the writer touches the file
        assert!(!file.exists());

        let saved = post_contact(&state, r#"{"name":"Ada","details":"d","message":"m"}"#).await;
        assert_eq!(saved.status, StatusCode::OK);
        let content = std::fs::read_to_string(file).unwrap();
        assert_eq!(content.matches("created,name,").count(), 1);
    }

    #[tokio::test]
    async fn test_missing_static_path_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let reply = get(&state, "/styles/main.css").await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_root_serves_frontend_index_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let frontend = dir.path().join("frontend");
        std::fs::create_dir(&frontend).unwrap();
        let index = b"<!doctype html><title>TechPro</title>\n\xe2\x9c\x93";
        std::fs::write(frontend.join("index.html"), index).unwrap();
        let state = test_state(dir.path());

        let reply = get(&state, "/").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(&reply.body[..], &index[..]);
        assert_eq!(reply.headers["content-type"], "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn test_root_without_frontend_serves_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let reply = get(&state, "/").await;
        assert_eq!(reply.status, StatusCode::OK);
        let page = String::from_utf8(reply.body.to_vec()).unwrap();
        assert!(page.contains("/api/contacts"));
        assert!(page.contains("/api/contact<"));
    }

    #[tokio::test]
    async fn test_static_asset_and_revalidation() {
        let dir = tempfile::tempdir().unwrap();
        let frontend = dir.path().join("frontend");
        std::fs::create_dir_all(frontend.join("js")).unwrap();
        std::fs::write(frontend.join("js/app.js"), "console.log('hi');").unwrap();
        let state = test_state(dir.path());

        let reply = get(&state, "/js/app.js").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(&reply.body[..], b"console.log('hi');");
        assert_eq!(
            reply.headers["content-type"],
            "text/javascript; charset=utf-8"
        );

        let etag = reply.headers["etag"].clone();
        let req = Request::get("/js/app.js")
            .header("if-none-match", etag)
            .body(Full::new(Bytes::new()))
            .unwrap();
        let cached = send(&state, req).await;
        assert_eq!(cached.status, StatusCode::NOT_MODIFIED);
        assert!(cached.body.is_empty());
    }

    #[tokio::test]
    async fn test_traversal_outside_frontend_is_404() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("frontend")).unwrap();
        let state = test_state(dir.path());
        // the target really exists next to the frontend dir
        state.store.init().await.unwrap();

        let reply = get(&state, "/../contacts.csv").await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        let reply = get(&state, "/%2e%2e/contacts.csv").await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        let reply = get(&state, "/js/%2E%2E%2F%2E%2E%2Fcontacts.csv").await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_percent_encoded_asset_names_are_served() {
        let dir = tempfile::tempdir().unwrap();
        let frontend = dir.path().join("frontend");
        std::fs::create_dir(&frontend).unwrap();
        std::fs::write(frontend.join("about us.html"), "<p>about</p>").unwrap();
        std::fs::write(frontend.join("résumé.txt"), "cv").unwrap();
        let state = test_state(dir.path());

        let reply = get(&state, "/about%20us.html").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(&reply.body[..], b"<p>about</p>");

        let reply = get(&state, "/r%C3%A9sum%C3%A9.txt").await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(&reply.body[..], b"cv");
    }

    #[tokio::test]
    async fn test_preflight_and_cors_headers() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/contact")
            .header("origin", "https://example.org")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let reply = send(&state, req).await;
        assert_eq!(reply.status, StatusCode::NO_CONTENT);
        assert_eq!(reply.headers["access-control-allow-origin"], "*");
        assert!(reply.headers.contains_key("access-control-allow-methods"));

        let listed = get(&state, "/api/contacts").await;
        assert_eq!(listed.headers["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_wrong_methods() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let reply = get(&state, "/api/contact").await;
        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(reply.headers["allow"], "POST, OPTIONS");

        let req = Request::put("/index.html")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let reply = send(&state, req).await;
        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_json_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let reply = get(&state, "/api/unknown").await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.json()["error"], "not_found");
    }

    #[tokio::test]
    async fn test_oversized_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::load_from("/nonexistent/contact-service-config").unwrap();
        cfg.storage.contacts_file = dir.path().join("contacts.csv").display().to_string();
        cfg.logging.access_log = false;
        cfg.http.max_body_size = 32;
        let store = ContactStore::new(&cfg.storage.contacts_file);
        let (writer, _task) = contact::writer::spawn(store.clone(), 1);
        let state = Arc::new(AppState::new(cfg, store, writer));

        let body = r#"{"name":"a","details":"b","message":"this message is far too long"}"#;

        // declared length is checked up front
        let req = Request::post("/api/contact")
            .header("content-length", body.len())
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap();
        assert_eq!(send(&state, req).await.status, StatusCode::PAYLOAD_TOO_LARGE);

        // undeclared length is caught while reading
        let reply = post_contact(&state, body).await;
        assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(reply.json()["error"], "payload_too_large");
    }
}
