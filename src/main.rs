use std::sync::Arc;

use routeshim::config::Config;
use routeshim::logger;
use routeshim::server::{self, App};

mod controllers;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config path as the first argument, `config.*` otherwise
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Handlers run cooperatively on one thread; connections are local tasks
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr, cfg.server.backlog)?;

    let app = Arc::new(App::new(cfg, controllers::all()));
    logger::log_server_start(&addr, &app.config, app.controllers.len());

    server::serve(listener, app, server::shutdown_signal()).await?;
    Ok(())
}
