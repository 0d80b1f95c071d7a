use anyhow::Context;
use drone_coordinator::loops::{cleanup_timer, idle_worker, proactive_timer, process_loop, receive_loop, shutdown};
use drone_coordinator::{AppState, Config};
use drone_protocol::Transport;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "coordinator exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let transport = Transport::bind(config.send_port, config.receive_port)
        .await
        .context("failed to bind coordinator transport")?;

    let zones = drone_coordinator::zone_file::load_zones(config.zone_file_path.as_deref());
    tracing::info!(zone_count = zones.len(), "zones loaded");

    let worker_count = config.idle_worker_pool_size;
    let state = Arc::new(AppState::new(config, transport, zones));

    let mut handles = Vec::new();
    handles.push(tokio::spawn(receive_loop(state.clone())));
    handles.push(tokio::spawn(process_loop(state.clone())));
    handles.push(tokio::spawn(cleanup_timer(state.clone())));
    handles.push(tokio::spawn(proactive_timer(state.clone())));
    for _ in 0..worker_count {
        handles.push(tokio::spawn(idle_worker(state.clone())));
    }

    wait_for_shutdown_signal().await;
    tracing::info!("shutdown signal received, draining");
    shutdown(&state).await;

    for handle in handles {
        handle.abort();
    }

    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
