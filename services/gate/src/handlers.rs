use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};
use turnstile_core::{CheckInLedger, CheckInOutcome, CheckInRecord, LedgerError};
use turnstile_crypto::{generate_ticket_number, TicketIdentity, TokenError};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub registration_id: String,
    pub event_id: String,
    pub user_id: String,
    #[serde(default)]
    pub ticket_number: Option<String>,
    /// People admitted on this ticket; required so a missing value is never signed
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub token: String,
    /// Event the door belongs to; tickets for other events are turned away
    #[serde(default)]
    pub event_id: Option<String>,
}

/// Runs `op` against the ledger on the blocking pool.
async fn with_ledger<T, F>(state: &Arc<AppState>, op: F) -> Result<T, StatusCode>
where
    F: FnOnce(&mut CheckInLedger) -> Result<T, LedgerError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);

    tokio::task::spawn_blocking(move || {
        let mut ledger = state.ledger.lock().map_err(|_| {
            error!("Check-in ledger lock poisoned");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

        op(&mut ledger).map_err(|e| {
            error!("Check-in ledger operation failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
    })
    .await
    .map_err(|e| {
        error!("Check-in ledger task failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
}

pub async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "turnstile-gate",
        "timestamp": Utc::now().to_rfc3339()
    })))
}

pub async fn issue_ticket(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IssueRequest>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let ticket_number = request
        .ticket_number
        .filter(|n| !n.is_empty())
        .unwrap_or_else(generate_ticket_number);

    let identity = TicketIdentity {
        registration_id: request.registration_id,
        event_id: request.event_id,
        user_id: request.user_id,
        ticket_number,
        quantity: request.quantity,
    };

    match state.codec.issue(&identity) {
        Ok(token) => {
            info!(
                registration_id = %identity.registration_id,
                event_id = %identity.event_id,
                ticket_number = %identity.ticket_number,
                "Ticket issued"
            );
            Ok((
                StatusCode::OK,
                Json(json!({
                    "token": token,
                    "ticketNumber": identity.ticket_number
                })),
            ))
        }
        Err(e @ TokenError::InvalidField { .. }) => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        )),
        Err(e) => {
            error!("Token issuance failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// The response never says why a token was rejected.
pub async fn verify_ticket(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<Value>, StatusCode> {
    match state.codec.verify(&request.token) {
        Some(ticket) => Ok(Json(json!({ "valid": true, "ticket": ticket }))),
        None => Ok(Json(json!({ "valid": false }))),
    }
}

pub async fn check_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckInRequest>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let Some(ticket) = state.codec.verify(&request.token) else {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "status": "invalid_token" })),
        ));
    };

    if let Some(door_event) = request.event_id.as_deref() {
        if door_event != ticket.event_id {
            warn!(
                registration_id = %ticket.registration_id,
                ticket_event = %ticket.event_id,
                door_event = %door_event,
                "Ticket presented at the wrong event"
            );
            return Ok((
                StatusCode::CONFLICT,
                Json(json!({
                    "status": "wrong_event",
                    "eventId": ticket.event_id
                })),
            ));
        }
    }

    let record = CheckInRecord {
        registration_id: ticket.registration_id.clone(),
        event_id: ticket.event_id.clone(),
        user_id: ticket.user_id.clone(),
        ticket_number: ticket.ticket_number.clone(),
        quantity: ticket.quantity,
        checked_in_at: Utc::now().timestamp_millis().max(0) as u64,
    };
    let checked_in_at = record.checked_in_at;

    let outcome = with_ledger(&state, move |ledger| ledger.record_check_in(record)).await?;

    match outcome {
        CheckInOutcome::Admitted => {
            info!(
                registration_id = %ticket.registration_id,
                event_id = %ticket.event_id,
                quantity = ticket.quantity,
                "Ticket admitted"
            );
            Ok((
                StatusCode::OK,
                Json(json!({
                    "status": "admitted",
                    "ticket": ticket,
                    "checkedInAt": checked_in_at
                })),
            ))
        }
        CheckInOutcome::AlreadyCheckedIn { previous } => Ok((
            StatusCode::CONFLICT,
            Json(json!({
                "status": "already_checked_in",
                "checkedInAt": previous.checked_in_at
            })),
        )),
    }
}

pub async fn get_check_in(
    State(state): State<Arc<AppState>>,
    Path(registration_id): Path<String>,
) -> Result<Json<CheckInRecord>, StatusCode> {
    let record = with_ledger(&state, move |ledger| ledger.get(&registration_id)).await?;

    record.map(Json).ok_or(StatusCode::NOT_FOUND)
}

pub async fn event_attendance(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let lookup_id = event_id.clone();
    let (registrations, attendees) = with_ledger(&state, move |ledger| {
        let registrations = ledger.count_for_event(&lookup_id)?;
        let attendees = ledger.attendees_for_event(&lookup_id)?;
        Ok((registrations, attendees))
    })
    .await?;

    Ok(Json(json!({
        "eventId": event_id,
        "registrations": registrations,
        "attendees": attendees
    })))
}
