use std::time::Duration;

use tokio::net::TcpListener;

use crate::error::MonitorError;

/// Inclusive-exclusive range of control ports monitors may bind to.
pub const PORT_RANGE: std::ops::Range<u16> = 9545..9644;

const PROBE_TIMEOUT: Duration = Duration::from_millis(250);

/// Finds a running monitor by probing `GET /status` across [`PORT_RANGE`],
/// concurrently, returning the first port that answers with a decodeable body.
pub async fn scan_for_monitor() -> Result<u16, MonitorError> {
    let client = reqwest::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .expect("reqwest client config is static and always valid");

    let mut handles = Vec::new();
    for port in PORT_RANGE {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let url = format!("http://127.0.0.1:{port}/status");
            let attempt = async {
                let response = client.get(&url).send().await.ok()?;
                if !response.status().is_success() {
                    return None;
                }
                response.json::<serde_json::Value>().await.ok()?;
                Some(port)
            };
            tokio::time::timeout(PROBE_TIMEOUT, attempt)
                .await
                .ok()
                .flatten()
        }));
    }

    let mut found = None;
    for handle in handles {
        if let Ok(Some(port)) = handle.await {
            found = Some(found.map_or(port, |p: u16| p.min(port)));
        }
    }

    found.ok_or(MonitorError::Discovery)
}

/// Returns the first port in [`PORT_RANGE`] with no TCP listener currently
/// bound, by attempting a bind-then-release on every port concurrently.
pub async fn first_available_port() -> Result<u16, MonitorError> {
    let mut handles = Vec::new();
    for port in PORT_RANGE {
        handles.push(tokio::spawn(async move {
            TcpListener::bind(("127.0.0.1", port)).await.ok().map(|_| port)
        }));
    }

    let mut found = None;
    for handle in handles {
        if let Ok(Some(port)) = handle.await {
            found = Some(found.map_or(port, |p: u16| p.min(port)));
        }
    }

    found.ok_or(MonitorError::Discovery)
}
