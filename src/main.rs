use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

mod api;
mod config;
mod contact;
mod error;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg.logging)?;

    // Worker threads default to the number of CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // Storage is initialized exactly once, before any request is served
    let store = contact::ContactStore::new(&cfg.storage.contacts_file);
    store.init().await?;
    let (writer, writer_task) = contact::writer::spawn(store.clone(), cfg.storage.queue_capacity);

    let listener = server::bind_listener(addr, cfg.server.backlog)?;
    let grace = Duration::from_secs(cfg.performance.shutdown_grace);
    let state = Arc::new(config::AppState::new(cfg, store, writer));
    let active_connections = Arc::new(AtomicUsize::new(0));

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    logger::log_server_start(&addr, &state.config);
    server::start_server_loop(
        listener,
        Arc::clone(&state),
        Arc::clone(&active_connections),
        shutdown,
    )
    .await;

    let remaining = server::wait_for_connections(&active_connections, grace).await;
    logger::log_shutdown_complete(remaining);

    // Last writer handle goes away with the state; the task drains its queue and exits.
    // Connections still open past the grace period keep their own handles alive.
    drop(state);
    contact::writer::drain(writer_task, grace.max(Duration::from_secs(1))).await;

    Ok(())
}
