//! Logger module
//!
//! Thin wrappers over `tracing` for server lifecycle, storage and error
//! events, plus access log formatting. Output goes through a
//! `tracing-subscriber` fmt layer, compact text or JSON lines.

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `logging.level`. Call once at startup.
pub fn init(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let json_layer = config.json.then(|| fmt::layer().with_target(true).json());
    let text_layer = (!config.json).then(|| fmt::layer().with_target(false).compact());

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Contact service listening on http://{addr}");
    tracing::info!(
        contacts_file = %config.storage.contacts_file,
        frontend_dir = %config.frontend.dir,
        "POST /api/contact, GET /api/contacts"
    );
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(max) = config.performance.max_connections {
        tracing::info!("Max connections: {max}");
    }
    tracing::debug!("Max body size: {} bytes", config.http.max_body_size);
}

pub fn log_storage_created(path: &Path) {
    tracing::info!("Created contacts file with header: {}", path.display());
}

pub fn log_contact_saved(source: &str) {
    tracing::info!(source, "Contact submission stored");
}

pub fn log_writer_stopped(written: usize) {
    tracing::info!("Contact writer stopped after {written} appends");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_shutdown_requested(signal: &str) {
    tracing::info!("{signal} received, shutting down");
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        tracing::info!("All connections closed, bye");
    } else {
        tracing::warn!("Shutdown grace period elapsed with {remaining} connections still open");
    }
}
