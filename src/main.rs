use std::sync::Arc;

use dixit_app::config::{AppState, Config};
use dixit_app::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional config file path (without extension), defaults to ./config.toml
    let config_path = std::env::args().nth(1);
    let cfg = Config::load(config_path.as_deref())?;
    logger::init(&cfg.logging)?;

    // Build the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::info!(workers, "Using configured worker threads");
    } else {
        tracing::info!("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::bind_listener(addr)?;
    logger::log_server_start(&listener.local_addr()?, &cfg);

    let state = Arc::new(AppState::new(cfg));

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    server::run(listener, state, Arc::clone(&signals.shutdown)).await?;
    Ok(())
}
