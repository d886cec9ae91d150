use std::process::Stdio;

use tokio::process::Command;
use tracing::{error, info, warn};

use crate::error::MonitorError;

/// Spawns the revival command for a node. Fire-and-forget: the caller does not
/// wait for the child to exit, only for it to start. A background task
/// consumes the exit status purely to log it.
pub fn dispatch(address: &str, cmd: &str, args: &str) -> Result<(), MonitorError> {
    let mut command = Command::new(cmd);
    command
        .arg(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(source) => {
            warn!(address, cmd, args, error = %source, "revival command failed to spawn");
            return Err(MonitorError::ReviveSpawn(source));
        }
    };

    info!(address, cmd, args, "revival dispatched");

    let address = address.to_string();
    let cmd = cmd.to_string();
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => info!(address, cmd, %status, "revival command exited"),
            Err(e) => error!(address, cmd, error = %e, "failed to await revival command"),
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatch_spawns_and_returns_immediately() {
        let result = dispatch("localhost:8545", "true", "ignored");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn dispatch_surfaces_spawn_failure() {
        let result = dispatch(
            "localhost:8545",
            "/definitely/not/a/real/binary",
            "ignored",
        );
        assert!(result.is_err());
    }
}
