//! Logger module
//!
//! Server lifecycle lines, per-request access log entries, dispatch failure
//! diagnostics and level-gated debug output.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::config::Config;
use crate::error::Failure;
use writer::Stream;

static LEVEL: OnceLock<LogLevel> = OnceLock::new();

/// Verbosity threshold, from `logging.level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" | "trace" => Ok(Self::Debug),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

fn enabled(level: LogLevel) -> bool {
    level <= LEVEL.get().copied().unwrap_or(LogLevel::Info)
}

/// Initialize sinks and level from configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config.logging.level.parse().unwrap_or_else(|e: String| {
        eprintln!("[WARN] {e}, falling back to info");
        LogLevel::Info
    });
    let _ = LEVEL.set(level);
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, controllers: usize) {
    let info = |line: &str| writer::write(Stream::Access, line);
    info("======================================");
    info("Dispatch server started");
    info(&format!("Listening on: http://{addr}"));
    info(&format!("Log level: {}", config.logging.level));
    info(&format!("Controllers: {controllers}"));
    info(&format!("Bindings: {}", config.env.len()));
    if let Some(ref path) = config.logging.access_log_file {
        info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        info(&format!("Error log: {path}"));
    }
    info("======================================\n");
}

pub fn log_info(message: &str) {
    if enabled(LogLevel::Info) {
        writer::write(Stream::Access, message);
    }
}

pub fn log_debug(message: &str) {
    if enabled(LogLevel::Debug) {
        writer::write(Stream::Access, &format!("[DEBUG] {message}"));
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    writer::write(Stream::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    if enabled(LogLevel::Warn) {
        writer::write(Stream::Error, &format!("[WARN] {message}"));
    }
}

/// Diagnostic line for anything caught by the dispatch core
pub fn log_dispatch_failure(method: &str, path: &str, failure: &Failure) {
    log_error(&format!("[Dispatch] {method} {path} {failure}"));
}

pub fn log_access(entry: &AccessLogEntry, format: &str) {
    writer::write(Stream::Access, &entry.format(format));
}

pub fn log_shutdown(reason: &str) {
    log_info(&format!("[Shutdown] {reason}, no longer accepting connections"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!("INFO".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("trace".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Info < LogLevel::Debug);
    }
}
