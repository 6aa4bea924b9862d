// Connection handling module
// Serves one accepted TCP connection with the request service

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;

use super::service::handle_request;
use super::App;
use crate::logger;

/// Serve an accepted connection in a local task
///
/// `active` counts connections still being served; it is decremented when
/// the connection closes or times out.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    app: &Arc<App>,
    active: &Arc<AtomicUsize>,
) {
    active.fetch_add(1, Ordering::SeqCst);
    logger::log_connection_accepted(&peer_addr);

    let app = Arc::clone(app);
    let active = Arc::clone(active);
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);
        let timeout = Duration::from_secs(app.config.http.request_timeout);

        let service_app = Arc::clone(&app);
        let conn = http1::Builder::new().keep_alive(true).serve_connection(
            io,
            service_fn(move |req| handle_request(req, Arc::clone(&service_app), peer_addr)),
        );

        match tokio::time::timeout(timeout, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {} seconds",
                timeout.as_secs()
            )),
        }

        active.fetch_sub(1, Ordering::SeqCst);
    });
}
