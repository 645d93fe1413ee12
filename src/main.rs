//! DSM Task Monitor
//!
//! Periodically polls one DSM device's task scheduler and backup
//! subsystems and logs the unified per-task records. Configuration
//! comes from `DSM_*` environment variables.

use std::sync::Arc;
use std::time::Duration;

use dsm_task_monitor::config::Config;
use dsm_task_monitor::coordinator::TaskCoordinator;
use dsm_task_monitor::dsm::DsmClient;
use dsm_task_monitor::poller::Poller;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        host = %config.dsm.host,
        port = config.dsm.port,
        interval_secs = config.poll.interval_secs,
        "configuration loaded"
    );

    let client = Arc::new(DsmClient::new(&config.dsm)?);
    let coordinator = Arc::new(TaskCoordinator::new(client));
    let poller = Poller::new(coordinator, Duration::from_secs(config.poll.interval_secs));

    info!("starting poll loop");
    tokio::select! {
        _ = poller.run() => {}
        _ = shutdown_signal() => {}
    }

    info!("shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("received SIGTERM, shutting down gracefully...");
        },
    }
}
