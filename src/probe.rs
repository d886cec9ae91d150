use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::error::MonitorError;

/// Issues JSON-RPC liveness probes against monitored node addresses.
///
/// Holds one shared `reqwest::Client` across the monitor's lifetime so probes
/// reuse pooled connections instead of paying a fresh handshake every tick.
#[derive(Debug, Clone)]
pub struct ProbeClient {
    http: reqwest::Client,
}

impl ProbeClient {
    pub fn new(request_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("reqwest client config is static and always valid");
        Self { http }
    }

    /// Probes `address`, bounded by `deadline`. A 2xx response with a
    /// JSON-parseable body is success; anything else — transport error,
    /// non-2xx, malformed body, or timeout — is failure.
    pub async fn probe(&self, address: &str, deadline: Duration) -> Result<(), MonitorError> {
        let url = format!("http://{address}/");
        let body = json!({
            "jsonrpc": "2.0",
            "method": "net_version",
            "params": [],
            "id": 1,
        });

        let attempt = async {
            let response = self
                .http
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| MonitorError::Probe(e.to_string()))?;

            if !response.status().is_success() {
                return Err(MonitorError::Probe(format!(
                    "non-2xx status {}",
                    response.status()
                )));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| MonitorError::Probe(format!("malformed body: {e}")))?;

            Ok(())
        };

        match tokio::time::timeout(deadline, attempt).await {
            Ok(result) => result,
            Err(_) => {
                debug!(address, "probe timed out");
                Err(MonitorError::Probe("timed out".into()))
            }
        }
    }
}
