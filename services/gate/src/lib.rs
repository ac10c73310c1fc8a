//! Turnstile gate: HTTP front for ticket issuance, verification and
//! door check-in.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::GateError;
pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let max_concurrent = state.config.server.max_concurrent_requests.max(1);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/tickets/issue", post(handlers::issue_ticket))
        .route("/tickets/verify", post(handlers::verify_ticket))
        .route("/checkin", post(handlers::check_in))
        .route("/checkin/:registration_id", get(handlers::get_check_in))
        .route("/events/:event_id/attendance", get(handlers::event_attendance))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(ConcurrencyLimitLayer::new(max_concurrent)))
}
