//! Request service
//!
//! Turns a hyper request into the four values the dispatch core is built
//! from, runs the core, and writes the access log line.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, USER_AGENT};
use hyper::{Request, Response, Version};

use super::App;
use crate::dispatch::{Core, ExecutionContext};
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    app: Arc<App>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let response = match buffer_request(req, app.config.http.max_body_size).await {
        Ok(request) => dispatch(request, &app).await,
        Err(response) => response,
    };
    let response = http::with_server_header(response, &app.config.http.server_name);

    if app.config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &app.config.logging.access_log_format);
    }

    Ok(response)
}

/// Build a fresh core for the request and run it
async fn dispatch(request: Request<Bytes>, app: &App) -> Response<Full<Bytes>> {
    let execution = ExecutionContext::new();
    let response = Core::new(
        request,
        Arc::clone(&app.env),
        execution.clone(),
        app.controllers.clone(),
    )
    .with_not_found_status(app.config.not_found_status())
    .handle()
    .await;

    if execution.pending() > 0 {
        let settling = Arc::clone(&app.settling);
        settling.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            let failed = execution.settle().await;
            if failed > 0 {
                logger::log_warning(&format!("{failed} background task(s) failed"));
            }
            settling.fetch_sub(1, Ordering::SeqCst);
        });
    }

    response
}

/// Buffer the request body, rejecting anything over `max_body_size`
async fn buffer_request<B>(
    req: Request<B>,
    max_body_size: u64,
) -> Result<Request<Bytes>, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(size) = declared_length(&req) {
        if size > max_body_size {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            return Err(http::build_413_response());
        }
    }

    let (parts, body) = req.into_parts();
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(Request::from_parts(parts, collected.to_bytes())),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!(
                "Request body exceeded {max_body_size} bytes while streaming"
            ));
            Err(http::build_413_response())
        }
        Err(err) => {
            logger::log_warning(&format!("Failed to read request body: {err}"));
            Err(http::build_400_response(&err.to_string()))
        }
    }
}

/// Content-Length, when present and valid
fn declared_length<B>(req: &Request<B>) -> Option<u64> {
    let value = req.headers().get(CONTENT_LENGTH)?;
    match value.to_str().ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(size) => Some(size),
        None => {
            logger::log_warning("Invalid Content-Length value, skipping size check");
            None
        }
    }
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
