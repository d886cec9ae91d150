use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::node::{MonitoredNode, NodeRecord};
use crate::scheduler::SharedRecords;
use crate::store::ConfigStore;

#[derive(Clone)]
struct ControlState {
    records: SharedRecords,
    store: ConfigStore,
    started_at: Instant,
}

pub fn router(records: SharedRecords, store: ConfigStore) -> Router {
    let state = Arc::new(ControlState {
        records,
        store,
        started_at: Instant::now(),
    });

    Router::new()
        .route("/status", get(status))
        .route("/add", post(add))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn status(State(state): State<Arc<ControlState>>) -> Json<Vec<MonitoredNode>> {
    let guard = state.records.read().await;
    Json(guard.clone())
}

async fn healthz(State(state): State<Arc<ControlState>>) -> Json<serde_json::Value> {
    let node_count = state.records.read().await.len();
    Json(json!({
        "status": "ok",
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "node_count": node_count,
    }))
}

#[derive(Debug, Deserialize)]
struct AddRequest {
    nodes: Vec<NodeRecord>,
}

#[derive(Debug, Serialize)]
struct AddResponse {
    nodes: Vec<NodeRecord>,
}

async fn add(
    State(state): State<Arc<ControlState>>,
    Json(payload): Json<AddRequest>,
) -> Response {
    if payload.nodes.is_empty() {
        return Json(AddResponse { nodes: Vec::new() }).into_response();
    }

    // all-or-nothing validation: reject the whole batch before touching storage.
    for record in &payload.nodes {
        if let Err(e) = record.validate() {
            return e.into_response();
        }
    }

    let mut added = Vec::with_capacity(payload.nodes.len());
    for record in payload.nodes {
        if let Err(e) = state.store.append(&record).await {
            let message = format!("failed to persist node '{}': {e}", record.address);
            tracing::error!(address = %record.address, error = %e, "config append failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response();
        }

        state
            .records
            .write()
            .await
            .push(MonitoredNode::new(record.clone()));
        added.push(record);
    }

    Json(AddResponse { nodes: added }).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc as StdArc;
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    fn empty_records() -> SharedRecords {
        StdArc::new(RwLock::new(Vec::new()))
    }

    #[tokio::test]
    async fn status_reflects_insertion_order() {
        let records = empty_records();
        {
            let mut guard = records.write().await;
            guard.push(MonitoredNode::new(NodeRecord {
                address: "localhost:8545".into(),
                revive_cmd: "touch".into(),
                revive_args: "a".into(),
            }));
            guard.push(MonitoredNode::new(NodeRecord {
                address: "localhost:8546".into(),
                revive_cmd: "touch".into(),
                revive_args: "b".into(),
            }));
        }
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nodes.jl"));
        let app = router(records, store);

        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn add_rejects_invalid_batch_with_400() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nodes.jl"));
        let app = router(empty_records(), store.clone());

        let body = json!({ "nodes": [{ "address": "", "reviveCmd": "touch", "reviveArgs": "a" }] });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/add")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_empty_list_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nodes.jl"));
        let app = router(empty_records(), store);

        let body = json!({ "nodes": [] });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/add")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
