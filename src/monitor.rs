use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::info;

use crate::control;
use crate::error::MonitorError;
use crate::node::MonitoredNode;
use crate::probe::ProbeClient;
use crate::scheduler::{HeartbeatScheduler, SharedRecords};
use crate::store::ConfigStore;

struct Running {
    shutdown_tx: watch::Sender<bool>,
    scheduler_handle: JoinHandle<()>,
    server_handle: JoinHandle<()>,
}

enum State {
    Idle,
    Running(Running),
    Stopped,
}

/// Owns a monitor's full lifetime: its record set, config store, and the
/// background scheduler and HTTP server tasks it spawns on [`start`](Monitor::start).
///
/// `start`/`stop` are the only public mutators of lifecycle state and are both
/// idempotent: a second `stop` after the first observes the `Stopped` state
/// and returns immediately without re-signaling or rebinding anything.
pub struct Monitor {
    config_path: PathBuf,
    heartbeat_interval: Duration,
    failure_tolerance: u32,
    records: SharedRecords,
    store: ConfigStore,
    state: Mutex<State>,
}

impl Monitor {
    /// Validates construction parameters and loads the config file. An empty
    /// initial record set is permitted; a malformed config file is not.
    pub fn new(
        config_path: PathBuf,
        heartbeat_interval: Duration,
        failure_tolerance: u32,
    ) -> Result<Self, MonitorError> {
        if heartbeat_interval.is_zero() {
            return Err(MonitorError::Validation(
                "heartbeatIntervalMs must be strictly positive".into(),
            ));
        }
        if failure_tolerance == 0 {
            return Err(MonitorError::Validation(
                "failureTolerance must be strictly positive".into(),
            ));
        }

        let store = ConfigStore::new(&config_path);
        let loaded = store.load()?;
        let records: Vec<MonitoredNode> = loaded.into_iter().map(MonitoredNode::new).collect();

        Ok(Self {
            config_path,
            heartbeat_interval,
            failure_tolerance,
            records: Arc::new(RwLock::new(records)),
            store,
            state: Mutex::new(State::Idle),
        })
    }

    pub fn records(&self) -> SharedRecords {
        self.records.clone()
    }

    /// Binds the control server to `port` and starts the heartbeat scheduler.
    /// A second call while already running is a no-op.
    pub async fn start(&self, port: u16) -> Result<(), MonitorError> {
        let mut state = self.state.lock().await;
        if matches!(&*state, State::Running(_)) {
            return Ok(());
        }

        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(MonitorError::Bind)?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let scheduler = HeartbeatScheduler::new(
            self.records.clone(),
            ProbeClient::new(self.heartbeat_interval),
            self.heartbeat_interval,
            self.failure_tolerance,
        );
        let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx.clone()));

        let app = control::router(self.records.clone(), self.store.clone());
        let mut server_shutdown_rx = shutdown_rx.clone();
        let server_handle = tokio::spawn(async move {
            let shutdown = async move {
                let _ = server_shutdown_rx.changed().await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(error = %e, "control server exited with error");
            }
        });

        info!(port, "monitor started");

        *state = State::Running(Running {
            shutdown_tx,
            scheduler_handle,
            server_handle,
        });
        Ok(())
    }

    /// Cancels the scheduler and control server and waits for both to finish.
    /// Idempotent: calling this after the first successful call is a no-op.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        let previous = std::mem::replace(&mut *state, State::Stopped);
        if let State::Running(running) = previous {
            let _ = running.shutdown_tx.send(true);
            let _ = running.scheduler_handle.await;
            let _ = running.server_handle.await;
            info!("monitor stopped");
        }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}
