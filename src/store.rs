use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::MonitorError;
use crate::node::NodeRecord;

/// Durable append-only store of [`NodeRecord`]s, one JSON object per line.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads every record from disk, in file order. Runs synchronously — this
    /// is only ever called once at startup, before the runtime has spawned
    /// any other task, so there is nothing for blocking IO to contend with.
    pub fn load(&self) -> Result<Vec<NodeRecord>, MonitorError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(MonitorError::ConfigWrite(e)),
        };

        let mut records = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: NodeRecord = serde_json::from_str(line)
                .map_err(|source| MonitorError::ConfigParse { line: idx + 1, source })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Appends one record as a newline-terminated JSON line. Dispatched through
    /// `spawn_blocking` so a slow or contended filesystem never stalls the
    /// async scheduler or control server.
    pub async fn append(&self, record: &NodeRecord) -> Result<(), MonitorError> {
        let path = self.path.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || append_blocking(&path, &record))
            .await
            .expect("append_blocking does not panic")
    }
}

fn append_blocking(path: &Path, record: &NodeRecord) -> Result<(), MonitorError> {
    let mut line = serde_json::to_string(record).expect("NodeRecord always serializes");
    line.push('\n');

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(MonitorError::ConfigWrite)?;

    file.write_all(line.as_bytes())
        .map_err(MonitorError::ConfigWrite)?;
    file.flush().map_err(MonitorError::ConfigWrite)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address: &str) -> NodeRecord {
        NodeRecord {
            address: address.into(),
            revive_cmd: "touch".into(),
            revive_args: "s1".into(),
        }
    }

    #[test]
    fn load_missing_file_is_empty() {
        let store = ConfigStore::new("/tmp/does-not-exist-node-sentinel.jl");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn load_rejects_malformed_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.jl");
        std::fs::write(&path, "not json\n").unwrap();
        let store = ConfigStore::new(&path);
        assert!(store.load().is_err());
    }

    #[tokio::test]
    async fn append_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.jl");
        let store = ConfigStore::new(&path);

        store.append(&record("localhost:8545")).await.unwrap();
        store.append(&record("localhost:8546")).await.unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].address, "localhost:8545");
        assert_eq!(loaded[1].address, "localhost:8546");
    }
}
