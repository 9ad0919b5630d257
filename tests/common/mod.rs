//! Fake discovery service and cluster members for end-to-end tests

#![allow(dead_code)]

use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use backup_relay::backup::BackupRunner;
use backup_relay::cli::RelayConfig;
use serde_json::json;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// Discovery service knowing a single cluster, `orders`, whose online
/// member is `127.0.0.1`
pub async fn spawn_discovery() -> String {
    async fn nodes(Path(cluster): Path<String>) -> Response {
        if cluster != "orders" {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"errorCode": 100, "message": "Key not found"})),
            )
                .into_response();
        }
        Json(json!({
            "action": "get",
            "node": {
                "key": "/mysql/orders/nodes",
                "dir": true,
                "nodes": [
                    {"key": "/mysql/orders/nodes/10.255.255.1", "value": "OFFLINE"},
                    {"key": "/mysql/orders/nodes/127.0.0.1", "value": "ONLINE"},
                    {"key": "/mysql/orders/nodes/10.255.255.2", "value": "ONLINE"}
                ]
            }
        }))
        .into_response()
    }

    let app = Router::new()
        .route("/health", get(|| async { Json(json!({"health": "true"})) }))
        .route("/v2/keys/mysql/:cluster/nodes", get(nodes));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr.to_string()
}

/// Member that streams `payload` to each connection and then closes it
pub async fn spawn_member(payload: Vec<u8>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        loop {
            let (mut socket, _) = listener.accept().await.unwrap();
            let payload = payload.clone();
            tokio::spawn(async move {
                socket.write_all(&payload).await.unwrap();
                socket.shutdown().await.unwrap();
            });
        }
    });
    port
}

/// Endpoint nobody listens on
pub fn dead_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

pub fn runner(root: &std::path::Path, discovery: &str, capture_port: u16) -> Arc<BackupRunner> {
    let config = RelayConfig {
        backup_root: root.to_path_buf(),
        discovery_service: discovery.to_string(),
        discovery_timeout_secs: 2,
        capture_port,
        buffer_size: 256,
        read_timeout_secs: 5,
        ..Default::default()
    };
    Arc::new(BackupRunner::new(Arc::new(config)).unwrap())
}

/// Deterministic test payload
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 253) as u8).collect()
}
