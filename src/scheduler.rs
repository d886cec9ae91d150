use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use crate::node::MonitoredNode;
use crate::probe::ProbeClient;
use crate::revive;

pub type SharedRecords = Arc<RwLock<Vec<MonitoredNode>>>;

/// Drives periodic, non-overlapping heartbeat ticks against every monitored
/// node and applies outcomes to the shared record set.
pub struct HeartbeatScheduler {
    records: SharedRecords,
    probe: ProbeClient,
    interval: Duration,
    failure_tolerance: u32,
}

impl HeartbeatScheduler {
    pub fn new(
        records: SharedRecords,
        probe: ProbeClient,
        interval: Duration,
        failure_tolerance: u32,
    ) -> Self {
        Self {
            records,
            probe,
            interval,
            failure_tolerance,
        }
    }

    /// Runs ticks until `shutdown_rx` observes a change. Mirrors the skip-then-loop
    /// shape of a one-shot heartbeat sender generalized to a per-tick fanout over
    /// every currently known node.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        tokio::select! {
            _ = tokio::time::sleep(self.interval) => {}
            _ = shutdown_rx.changed() => return,
        }

        loop {
            self.tick().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown_rx.changed() => break,
            }
        }
    }

    async fn tick(&self) {
        let snapshot: Vec<(usize, String)> = {
            let guard = self.records.read().await;
            guard
                .iter()
                .enumerate()
                .map(|(i, n)| (i, n.address().to_string()))
                .collect()
        };

        let mut handles = Vec::with_capacity(snapshot.len());
        for (index, address) in snapshot {
            let probe = self.probe.clone();
            let deadline = self.interval;
            handles.push(tokio::spawn(async move {
                (index, probe.probe(&address, deadline).await)
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => warn!(error = %e, "probe task panicked"),
            }
        }

        let mut revivals: Vec<(String, String, String)> = Vec::new();
        {
            let mut guard = self.records.write().await;
            for (index, outcome) in outcomes {
                let Some(node) = guard.get_mut(index) else {
                    continue;
                };
                match outcome {
                    Ok(()) => {
                        debug!(address = node.address(), "probe ok");
                        node.record_success();
                    }
                    Err(e) => {
                        debug!(address = node.address(), error = %e, "probe failed");
                        if node.record_failure(self.failure_tolerance) {
                            revivals.push((
                                node.address().to_string(),
                                node.record.revive_cmd.clone(),
                                node.record.revive_args.clone(),
                            ));
                        }
                    }
                }
            }
        }

        for (address, cmd, args) in revivals {
            if let Err(e) = revive::dispatch(&address, &cmd, &args) {
                warn!(address, error = %e, "revival dispatch failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeRecord;

    #[tokio::test]
    async fn tick_applies_probe_outcomes_independent_of_scan_order() {
        let records: SharedRecords = Arc::new(RwLock::new(vec![
            MonitoredNode::new(NodeRecord {
                address: "127.0.0.1:1".into(),
                revive_cmd: "true".into(),
                revive_args: "x".into(),
            }),
            MonitoredNode::new(NodeRecord {
                address: "127.0.0.1:2".into(),
                revive_cmd: "true".into(),
                revive_args: "y".into(),
            }),
        ]));

        let scheduler = HeartbeatScheduler::new(
            records.clone(),
            ProbeClient::new(Duration::from_millis(50)),
            Duration::from_millis(50),
            5,
        );

        scheduler.tick().await;

        let guard = records.read().await;
        // both addresses are unreachable loopback ports; both probes fail.
        assert_eq!(guard[0].failures, 1);
        assert_eq!(guard[1].failures, 1);
        assert!(!guard[0].alive);
        assert!(!guard[1].alive);
    }
}
