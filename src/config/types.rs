// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub frontend: FrontendConfig,
    pub contact: ContactConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Listen backlog passed to `listen(2)`
    pub backlog: i32,
}

/// Contact storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// CSV file holding all submitted contacts
    pub contacts_file: String,
    /// Pending appends buffered in front of the writer task
    pub queue_capacity: usize,
}

/// Static frontend bundle location
#[derive(Debug, Deserialize, Clone)]
pub struct FrontendConfig {
    pub dir: String,
    pub index_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContactConfig {
    /// Label stored when a submission carries no `meta.source`
    pub default_source: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Emit JSON lines instead of the compact text format
    pub json: bool,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Seconds to wait for in-flight connections on shutdown
    pub shutdown_grace: u64,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}
