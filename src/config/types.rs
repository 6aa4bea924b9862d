// Configuration types module
// Every section deserializes from the layered `config` sources

use serde::Deserialize;

use crate::dispatch::Env;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub dispatch: DispatchConfig,
    /// Bindings handed to every request as its environment
    #[serde(default)]
    pub env: Env,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Listen backlog
    pub backlog: u32,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Largest request body buffered for a handler, in bytes
    pub max_body_size: u64,
    /// Seconds a connection may stay open
    pub request_timeout: u64,
}

/// Dispatch behaviour
#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    /// Status returned when no route matches
    pub not_found_status: u16,
}
