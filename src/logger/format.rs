//! Access log entries and their formats
//!
//! - `combined`: Apache/Nginx combined format
//! - `common`: Common Log Format
//! - `json`: one JSON object per line
//! - anything else is a pattern with `$variable` substitution

use chrono::Local;

/// One dispatched request, as it appears in the access log
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string without the leading `?`
    pub query: Option<String>,
    pub http_version: String,
    pub status: u16,
    pub body_bytes: u64,
    pub user_agent: Option<String>,
    /// Dispatch time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Entry stamped with the current local time
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            user_agent: None,
            request_time_us: 0,
        }
    }

    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => format!(
                "{} \"-\" \"{}\"",
                self.format_common(),
                self.user_agent.as_deref().unwrap_or("-")
            ),
            "common" => self.format_common(),
            "json" => self.format_json(),
            pattern => self.format_pattern(pattern),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn time_local(&self) -> String {
        self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string()
    }

    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time_local(),
            self.method,
            self.request_uri(),
            self.http_version,
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Supported variables: `$remote_addr`, `$time_local`, `$time_iso8601`,
    /// `$request`, `$request_method`, `$request_uri`, `$request_time`,
    /// `$status`, `$body_bytes_sent`, `$http_user_agent`
    fn format_pattern(&self, pattern: &str) -> String {
        let request_uri = self.request_uri();
        #[allow(clippy::cast_precision_loss)]
        let request_time = self.request_time_us as f64 / 1_000_000.0;

        // $request_* before $request
        pattern
            .replace("$remote_addr", &self.remote_addr)
            .replace("$time_local", &self.time_local())
            .replace("$time_iso8601", &self.time.to_rfc3339())
            .replace("$request_time", &format!("{request_time:.3}"))
            .replace("$request_method", &self.method)
            .replace("$request_uri", &request_uri)
            .replace(
                "$request",
                &format!("{} {request_uri} HTTP/{}", self.method, self.http_version),
            )
            .replace("$status", &self.status.to_string())
            .replace("$body_bytes_sent", &self.body_bytes.to_string())
            .replace("$http_user_agent", self.user_agent.as_deref().unwrap_or("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "10.0.0.7".to_string(),
            "GET".to_string(),
            "/users/42".to_string(),
        );
        entry.query = Some("fields=name".to_string());
        entry.status = 500;
        entry.body_bytes = 9;
        entry.user_agent = Some("curl/8.5".to_string());
        entry.request_time_us = 2600;
        entry
    }

    #[test]
    fn test_common() {
        let line = entry().format("common");
        assert!(line.starts_with("10.0.0.7 - - ["));
        assert!(line.ends_with("\"GET /users/42?fields=name HTTP/1.1\" 500 9"));
        assert!(!line.contains("curl"));
    }

    #[test]
    fn test_combined_adds_user_agent() {
        let line = entry().format("combined");
        assert!(line.contains("\"GET /users/42?fields=name HTTP/1.1\" 500 9"));
        assert!(line.ends_with("\"curl/8.5\""));
    }

    #[test]
    fn test_json_is_parseable() {
        let line = entry().format("json");
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["status"], 500);
        assert_eq!(value["path"], "/users/42");
        assert_eq!(value["query"], "fields=name");
    }

    #[test]
    fn test_pattern() {
        let line = entry().format("$request_method $request_uri -> $status in $request_time");
        assert_eq!(line, "GET /users/42?fields=name -> 500 in 0.003");

        let line = entry().format("[$request]");
        assert_eq!(line, "[GET /users/42?fields=name HTTP/1.1]");
    }
}
