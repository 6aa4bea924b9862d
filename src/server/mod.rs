// Server module entry
// Hosts the dispatch core behind a hyper HTTP/1 server

mod accept;
mod connection;
mod listener;
pub mod service;
mod signal;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::Env;
use crate::registry::ControllerClass;

pub use accept::serve;
pub use listener::create_reusable_listener;
pub use signal::shutdown_signal;

/// Everything shared by all requests: configuration, bindings, controllers
pub struct App {
    pub config: Config,
    pub env: Arc<Env>,
    pub controllers: Vec<ControllerClass>,
    /// Requests whose `wait_until` work is still being settled
    settling: Arc<AtomicUsize>,
}

impl App {
    pub fn new(config: Config, controllers: Vec<ControllerClass>) -> Self {
        let env = Arc::new(config.env.clone());
        Self {
            config,
            env,
            controllers,
            settling: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Requests with background work not yet settled
    pub fn settling(&self) -> usize {
        self.settling.load(Ordering::SeqCst)
    }
}
