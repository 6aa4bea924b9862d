// Accept loop module
// Accepts connections until the shutdown future resolves, then drains

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::App;
use crate::logger;

const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept and serve connections until `shutdown` resolves
///
/// Must run inside a `LocalSet`: every connection is a local task. After
/// shutdown, in-flight connections get up to `http.request_timeout` to finish.
pub async fn serve<S>(listener: TcpListener, app: Arc<App>, shutdown: S) -> std::io::Result<()>
where
    S: Future<Output = &'static str>,
{
    let active = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &app, &active),
                Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
            },
            reason = &mut shutdown => {
                logger::log_shutdown(reason);
                break;
            }
        }
    }

    drop(listener);
    drain(&app, &active, Duration::from_secs(app.config.http.request_timeout)).await;
    Ok(())
}

/// Wait for open connections and unsettled background work, up to `limit`
///
/// Returns how many of each were still outstanding when it gave up.
async fn drain(app: &App, active: &AtomicUsize, limit: Duration) -> (usize, usize) {
    let deadline = tokio::time::Instant::now() + limit;
    let outstanding = || (active.load(Ordering::SeqCst), app.settling());

    while outstanding() != (0, 0) && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(DRAIN_POLL).await;
    }

    let (connections, settling) = outstanding();
    if connections > 0 {
        logger::log_warning(&format!("{connections} connection(s) still open at exit"));
    }
    if settling > 0 {
        logger::log_warning(&format!(
            "{settling} request(s) with background work still pending at exit, dropping it"
        ));
    }
    (connections, settling)
}
