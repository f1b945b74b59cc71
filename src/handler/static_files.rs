//! Static frontend serving module
//!
//! Serves the optional frontend bundle: the index file at `/`, any other
//! file below the frontend directory at its path. Without an index file
//! `/` gets a small landing page describing the API.

use crate::config::FrontendConfig;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Request context encapsulating information needed for static responses
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// GET /
pub async fn serve_root(ctx: &RequestContext<'_>, frontend: &FrontendConfig) -> Response<Full<Bytes>> {
    let index = Path::new(&frontend.dir).join(&frontend.index_file);
    match load_file(&index).await {
        Some((content, content_type)) => build_file_response(content, content_type, ctx),
        None => http::build_html_response(fallback_page(&frontend.dir), ctx.is_head),
    }
}

/// GET /<path>
pub async fn serve_asset(ctx: &RequestContext<'_>, frontend: &FrontendConfig) -> Response<Full<Bytes>> {
    let Some(path) = resolve_asset(&frontend.dir, ctx.path).await else {
        return http::build_404_response();
    };
    match load_file(&path).await {
        Some((content, content_type)) => build_file_response(content, content_type, ctx),
        None => http::build_404_response(),
    }
}

/// Map a request path to an existing file inside `static_dir`
async fn resolve_asset(static_dir: &str, request_path: &str) -> Option<PathBuf> {
    // browsers send non-ASCII and spaces percent-encoded
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    let relative = decoded.trim_start_matches('/');
    if relative.is_empty() || relative.contains('\0') {
        return None;
    }
    if relative.split(|c: char| c == '/' || c == '\\').any(|segment| segment == "..") {
        logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
        return None;
    }

    // frontend directory is optional, a missing one is just a 404
    let root = fs::canonicalize(static_dir).await.ok()?;
    let candidate = fs::canonicalize(root.join(relative)).await.ok()?;
    if !candidate.starts_with(&root) {
        logger::log_warning(&format!(
            "Path escapes frontend directory: {request_path} -> {}",
            candidate.display()
        ));
        return None;
    }
    Some(candidate)
}

/// Read a regular file; directories and missing files yield `None`
async fn load_file(path: &Path) -> Option<(Bytes, &'static str)> {
    let meta = fs::metadata(path).await.ok()?;
    if !meta.is_file() {
        return None;
    }

    match fs::read(path).await {
        Ok(content) => Some((Bytes::from(content), mime::content_type_for(path))),
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
            None
        }
    }
}

fn build_file_response(
    content: Bytes,
    content_type: &str,
    ctx: &RequestContext<'_>,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }
    http::build_static_response(content, content_type, &etag, ctx.is_head)
}

/// Landing page shown at `/` when no frontend bundle is installed
pub fn fallback_page(frontend_dir: &str) -> String {
    let frontend_dir = escape_html(frontend_dir);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>TechPro Contact API</title>
    <style>
        body {{ font-family: system-ui, Arial, sans-serif; line-height: 1.5; padding: 24px; max-width: 720px; }}
        code {{ background: #f3f4f6; padding: 1px 4px; border-radius: 4px; }}
    </style>
</head>
<body>
    <h2>TechPro Projects: Contact API</h2>
    <p>No frontend found in <code>{frontend_dir}</code>. Available endpoints:</p>
    <ul>
        <li><strong>GET</strong> <a href="/api/contacts">/api/contacts</a>: list saved contacts</li>
        <li><strong>POST</strong> <code>/api/contact</code>: accept JSON <code>{{name, details, message, meta?}}</code></li>
    </ul>
    <p>Place the frontend build in <code>{frontend_dir}</code> (or set <code>frontend.dir</code>) to serve it from this address.</p>
</body>
</html>"#
    )
}

fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(|c: char| matches!(c, '<' | '>' | '&' | '"')) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}
