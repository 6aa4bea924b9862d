// Configuration module entry point
// Loads configuration from an optional file plus environment overrides

mod types;

use std::net::SocketAddr;

use hyper::StatusCode;

pub use types::{Config, DispatchConfig, HttpConfig, LoggingConfig, ServerConfig};

/// Prefix for environment overrides, e.g. `ROUTESHIM_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "ROUTESHIM";

impl Config {
    /// Load configuration from the given file path (extension optional)
    ///
    /// A missing file is not an error; defaults and environment variables
    /// still apply.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.backlog", 128)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("http.server_name", concat!("routeshim/", env!("CARGO_PKG_VERSION")))?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("http.request_timeout", 30)?
            .set_default("dispatch.not_found_status", 500)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Not-found status as a `StatusCode`, 500 if the configured value is invalid
    pub fn not_found_status(&self) -> StatusCode {
        StatusCode::from_u16(self.dispatch.not_found_status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
