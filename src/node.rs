use serde::{Deserialize, Serialize};

/// The durable, wire-facing shape of one node: what the config file stores and
/// what `/add` accepts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeRecord {
    pub address: String,
    #[serde(rename = "reviveCmd")]
    pub revive_cmd: String,
    #[serde(rename = "reviveArgs")]
    pub revive_args: String,
}

impl NodeRecord {
    /// Validates the three fields are non-empty and `address` parses as host:port.
    pub fn validate(&self) -> Result<(), crate::error::MonitorError> {
        if self.address.trim().is_empty() {
            return Err(crate::error::MonitorError::Validation(
                "address must not be empty".into(),
            ));
        }
        if self.revive_cmd.trim().is_empty() {
            return Err(crate::error::MonitorError::Validation(
                "reviveCmd must not be empty".into(),
            ));
        }
        if self.revive_args.trim().is_empty() {
            return Err(crate::error::MonitorError::Validation(
                "reviveArgs must not be empty".into(),
            ));
        }
        let mut parts = self.address.rsplitn(2, ':');
        let port = parts.next().unwrap_or("");
        let host = parts.next().unwrap_or("");
        if host.is_empty() || port.parse::<u16>().is_err() {
            return Err(crate::error::MonitorError::Validation(format!(
                "address '{}' is not a valid host:port",
                self.address
            )));
        }
        Ok(())
    }
}

/// A single monitored JSON-RPC endpoint and its failure state.
///
/// `alive` mirrors the outcome of the *last* probe; `failures` is the count of
/// consecutive failures since the last success. `revived` suppresses repeated
/// revival dispatch while a node remains down past the tolerance threshold.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoredNode {
    #[serde(flatten)]
    pub record: NodeRecord,
    #[serde(skip)]
    pub failures: u32,
    pub alive: bool,
    #[serde(skip)]
    pub revived: bool,
}

impl MonitoredNode {
    pub fn new(record: NodeRecord) -> Self {
        Self {
            record,
            failures: 0,
            alive: false,
            revived: false,
        }
    }

    pub fn address(&self) -> &str {
        &self.record.address
    }

    pub fn record_success(&mut self) {
        self.failures = 0;
        self.alive = true;
        self.revived = false;
    }

    /// Applies one failed probe. Returns `true` iff this failure just crossed
    /// the tolerance threshold and revival should be dispatched.
    pub fn record_failure(&mut self, failure_tolerance: u32) -> bool {
        self.failures = self.failures.saturating_add(1);
        self.alive = false;
        if self.failures == failure_tolerance && !self.revived {
            self.revived = true;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> NodeRecord {
        NodeRecord {
            address: "localhost:8545".into(),
            revive_cmd: "touch".into(),
            revive_args: "s1".into(),
        }
    }

    #[test]
    fn failure_below_tolerance_does_not_trigger_revival() {
        let mut node = MonitoredNode::new(record());
        for _ in 0..4 {
            assert!(!node.record_failure(5));
        }
        assert_eq!(node.failures, 4);
        assert!(!node.alive);
    }

    #[test]
    fn failure_at_tolerance_triggers_revival_exactly_once() {
        let mut node = MonitoredNode::new(record());
        for _ in 0..4 {
            node.record_failure(5);
        }
        assert!(node.record_failure(5));
        // further failures must not re-trigger
        assert!(!node.record_failure(5));
        assert!(!node.record_failure(5));
    }

    #[test]
    fn success_resets_counters() {
        let mut node = MonitoredNode::new(record());
        for _ in 0..5 {
            node.record_failure(5);
        }
        node.record_success();
        assert_eq!(node.failures, 0);
        assert!(node.alive);
        assert!(!node.revived);
    }

    #[test]
    fn spec_rejects_empty_fields() {
        let spec = NodeRecord {
            address: "".into(),
            revive_cmd: "touch".into(),
            revive_args: "s1".into(),
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn spec_rejects_bad_address() {
        let spec = NodeRecord {
            address: "not-a-host-port".into(),
            revive_cmd: "touch".into(),
            revive_args: "s1".into(),
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn spec_accepts_valid_entry() {
        assert!(record().validate().is_ok());
    }
}
