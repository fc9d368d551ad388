//! subgauge exporter
//!
//! - Targets from `SUBGAUGE_CONFIG` (YAML) and/or `XUI_EXPORTER_TARGETS`
//! - One refresh before serving, then a single-flight periodic refresh
//! - Prometheus text on the configured metrics path
//! - Ctrl-C: mark draining, stop the schedule, finish in-flight requests

use std::process::ExitCode;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subgauge_core::error::{Result, SubgaugeError};
use subgauge_exporter::{app_state::AppState, config, refresh, router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code(), error = %e, "subgauge-exporter failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg = config::load()?;
    let listen = cfg.exporter.listen_addr()?;
    let every = cfg.exporter.refresh_interval();
    tracing::info!(targets = cfg.targets.len(), "configuration loaded");

    let state = AppState::new(cfg)?;

    tracing::info!("performing initial refresh");
    state.refresher().run_cycle(&state.targets()).await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let schedule = tokio::spawn(refresh::run_schedule(
        state.refresher(),
        state.targets(),
        every,
        shutdown_rx,
    ));

    let app = router::build_router(state.clone());
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| SubgaugeError::Internal(format!("failed to bind {listen}: {e}")))?;

    tracing::info!(%listen, metrics_path = %state.cfg().exporter.metrics_path, "subgauge-exporter starting");

    let drain = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutdown requested, draining");
            drain.set_draining();
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| SubgaugeError::Internal(format!("server failed: {e}")))?;

    if let Err(e) = schedule.await {
        tracing::warn!(error = %e, "refresh schedule task ended abnormally");
    }
    Ok(())
}
