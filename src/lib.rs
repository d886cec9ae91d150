pub mod config;
pub mod control;
pub mod discovery;
pub mod error;
pub mod monitor;
pub mod node;
pub mod probe;
pub mod revive;
pub mod scheduler;
pub mod store;

use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

pub use config::Config;
pub use error::MonitorError;
pub use monitor::Monitor;

/// Initializes the global tracing subscriber from `config`. Call once, before
/// spawning any other task.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Builds and starts a [`Monitor`] from `config`, resolving the control port
/// via explicit flag or discovery, and runs it until ctrl-c or SIGTERM.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let heartbeat_interval = Duration::from_millis(config.heartbeat_interval_ms);
    let monitor = Monitor::new(
        config.config.clone(),
        heartbeat_interval,
        config.failure_tolerance,
    )?;

    let port = match config.port {
        Some(port) => port,
        None => discovery::first_available_port().await?,
    };

    monitor.start(port).await?;
    info!(port, config = %config.config.display(), "node-sentinel running");

    wait_for_shutdown().await;

    info!("shutdown signal received, stopping monitor");
    monitor.stop().await;
    Ok(())
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
