//! Test utilities for cross-crate integration tests

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use turnstile_core::{CheckInLedger, Config};
use turnstile_crypto::{TicketIdentity, TicketTokenCodec, TokenSecret};
use turnstile_gate::{router, AppState};

/// Install a test-friendly subscriber once; later calls are no-ops.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

pub fn codec_with_secret(secret: &str) -> TicketTokenCodec {
    TicketTokenCodec::new(TokenSecret::new(secret).expect("test secret must be non-empty"))
}

pub fn identity(registration_id: &str, event_id: &str, quantity: u32) -> TicketIdentity {
    TicketIdentity {
        registration_id: registration_id.to_string(),
        event_id: event_id.to_string(),
        user_id: format!("user-of-{}", registration_id),
        ticket_number: format!("TKT-{}", registration_id),
        quantity,
    }
}

/// Unique ledger path under the system temp dir.
pub fn temp_ledger_path() -> PathBuf {
    std::env::temp_dir().join(format!("turnstile_it_{}.db", uuid::Uuid::new_v4()))
}

pub fn remove_ledger(path: &PathBuf) {
    std::fs::remove_file(path).ok();
    std::fs::remove_file(path.with_extension("db-wal")).ok();
    std::fs::remove_file(path.with_extension("db-shm")).ok();
}

/// Gate router over a file-backed ledger and a fixed secret.
pub fn gate_app(secret: &str, ledger_path: &PathBuf) -> Router {
    let mut config = Config::default_config();
    config.ledger.path = ledger_path.display().to_string();

    let ledger = CheckInLedger::open(ledger_path).expect("failed to open test ledger");
    let state = AppState::with_parts(config, codec_with_secret(secret), ledger);
    router(Arc::new(state))
}

/// Send a request and decode the JSON body (Null when empty).
pub async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .expect("failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router call failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");

    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
