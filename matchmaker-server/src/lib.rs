//! Orchestrates the matchmaking engine and its HTTP transport: binds a
//! listener, spawns the tick scheduler, serves the router, and tears both
//! down on shutdown. Mirrors the teacher's `gateway::run` /
//! `server::run_with_ctrl_c` split between a single-service runner and an
//! outer ctrl-c wrapper.

pub mod http;
pub mod settings;
pub mod telemetry;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{error, info};

pub use matchmaker_core::BoxError;
pub use settings::{ServerConfig, ServerSettings};

use matchmaker_core::{shutdown, Engine};

/// Optional hook for tests that need to know the bound ephemeral port
/// before making requests, same readiness-handshake idiom as the
/// teacher's `GatewayConfig::ready_tx`.
#[derive(Default)]
pub struct RunOptions {
    pub ready_tx: Option<oneshot::Sender<SocketAddr>>,
}

pub async fn run() -> Result<(), BoxError> {
    let config = ServerConfig::from_env()?;
    run_with_ctrl_c(config).await
}

pub async fn run_with_ctrl_c(config: ServerConfig) -> Result<(), BoxError> {
    let (shutdown_tx, shutdown_rx) = shutdown::channel();

    let ctrl_c = tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "matchmaker-server: failed to listen for ctrl_c");
        }
        shutdown::trigger(&shutdown_tx);
    });

    let result = run_with_shutdown(config, shutdown_rx, RunOptions::default()).await;

    ctrl_c.abort();
    result
}

pub async fn run_with_shutdown(
    config: ServerConfig,
    shutdown_rx: shutdown::ShutdownReceiver,
    options: RunOptions,
) -> Result<(), BoxError> {
    let engine = Arc::new(Engine::new(config.engine));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|err| Box::new(err) as BoxError)?;
    let local_addr = listener.local_addr().map_err(|err| Box::new(err) as BoxError)?;
    if let Some(tx) = options.ready_tx {
        let _ = tx.send(local_addr);
    }

    let scheduler_engine = engine.clone();
    let scheduler_shutdown = shutdown_rx.clone();
    let scheduler_task = tokio::spawn(async move {
        scheduler_engine.run_scheduler(scheduler_shutdown).await;
    });

    let router = http::build_router(engine);
    info!(addr = %local_addr, "matchmaker-server: listening");
    let server_shutdown = shutdown_rx.clone();
    let server_task = tokio::spawn(async move {
        let result = axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(shutdown::wait(server_shutdown))
            .await;
        if let Err(err) = result {
            error!(%err, "matchmaker-server: http server stopped unexpectedly");
        }
    });

    shutdown::wait(shutdown_rx).await;
    let _ = server_task.await;
    // `run_scheduler` exits cooperatively once it observes the shutdown
    // signal; join rather than abort so an in-flight tick's commit
    // (removal, outbox push, journal append) always finishes (§4.D: "a run
    // flag is cleared and the worker is joined").
    let _ = scheduler_task.await;

    Ok(())
}
