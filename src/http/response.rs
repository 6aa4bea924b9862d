//! HTTP response builders
//!
//! Every builder falls back to a bare response if the builder rejects its
//! input, logging the failure instead of panicking.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE, SERVER};
use hyper::{Response, StatusCode};
use serde::Serialize;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// Serialize `body` as compact JSON
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build(status, JSON, Bytes::from(json)),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build(
                StatusCode::INTERNAL_SERVER_ERROR,
                TEXT,
                Bytes::from_static(b"Unknown Error"),
            )
        }
    }
}

/// Plain-text response
pub fn text_response(status: StatusCode, message: impl Into<String>) -> Response<Full<Bytes>> {
    build(status, TEXT, Bytes::from(message.into()))
}

/// 413 Payload Too Large
pub fn build_413_response() -> Response<Full<Bytes>> {
    text_response(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// 400 Bad Request, used when the request body cannot be read
pub fn build_400_response(reason: &str) -> Response<Full<Bytes>> {
    text_response(StatusCode::BAD_REQUEST, format!("400 Bad Request: {reason}"))
}

/// Stamp the `Server` header onto a response
pub fn with_server_header(mut response: Response<Full<Bytes>>, server_name: &str) -> Response<Full<Bytes>> {
    match HeaderValue::from_str(server_name) {
        Ok(value) => {
            response.headers_mut().insert(SERVER, value);
        }
        Err(_) => crate::logger::log_warning(&format!("Invalid server name header: {server_name:?}")),
    }
    response
}

fn build(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            let mut fallback = Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
