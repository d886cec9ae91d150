use std::path::PathBuf;

use clap::Parser;

/// Command-line and environment configuration for the monitor daemon.
///
/// Every field resolves CLI flag, then `NODE_SENTINEL_*` environment
/// variable, then default, in that order.
#[derive(Debug, Parser)]
#[command(name = "node-sentinel", version, about = "Liveness monitor and revival daemon for a fleet of JSON-RPC nodes")]
pub struct Config {
    /// Path to the append-only node config file.
    #[arg(long, env = "NODE_SENTINEL_CONFIG")]
    pub config: PathBuf,

    /// Port the control server binds to. Leave unset to auto-discover a free
    /// port in the [9545, 9644) range.
    #[arg(long, env = "NODE_SENTINEL_PORT")]
    pub port: Option<u16>,

    /// Milliseconds between heartbeat ticks.
    #[arg(long, env = "NODE_SENTINEL_HEARTBEAT_INTERVAL_MS", default_value_t = 1000)]
    pub heartbeat_interval_ms: u64,

    /// Consecutive failures before a revival is dispatched.
    #[arg(long, env = "NODE_SENTINEL_FAILURE_TOLERANCE", default_value_t = 5)]
    pub failure_tolerance: u32,

    /// Log filter directive, e.g. "info" or "node_sentinel=debug".
    #[arg(long, env = "NODE_SENTINEL_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON instead of plain text.
    #[arg(long, env = "NODE_SENTINEL_LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}
