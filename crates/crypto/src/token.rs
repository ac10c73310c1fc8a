//! Ticket Token Codec - Signed bearer tokens for event admission
//!
//! A ticket token is a self-contained JSON document carrying a ticket's
//! identity plus a SHA-256 digest keyed with a server-held secret:
//!
//! ```text
//! {"registrationId":..,"eventId":..,"userId":..,"ticketNumber":..,
//!  "quantity":..,"timestamp":..,"hash":"<64 lowercase hex chars>"}
//! ```
//!
//! # Digest
//!
//! `hash = hex(SHA-256(canonical_claims || secret))` where `canonical_claims`
//! is the compact JSON of the six data fields in exactly the order above.
//! The order is fixed by the [`TicketClaims`] layout, never by map iteration.
//!
//! # Security Model
//!
//! - Tokens are not stored; validity depends only on the presented bytes
//!   and the secret
//! - Any change to any field, including `hash`, fails verification
//! - Digest comparison is constant-time
//! - The issue timestamp is carried but never checked against a window;
//!   expiry policy belongs to the caller

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, warn};

use crate::secret::TokenSecret;

/// Length of the hex-encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// Ticket identity supplied by the registration workflow at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketIdentity {
    pub registration_id: String,
    pub event_id: String,
    pub user_id: String,
    pub ticket_number: String,
    pub quantity: u32,
}

impl TicketIdentity {
    /// Structural checks only. Whether the registration exists is the
    /// caller's concern.
    pub fn validate(&self) -> Result<(), TokenError> {
        let strings = [
            ("registrationId", &self.registration_id),
            ("eventId", &self.event_id),
            ("userId", &self.user_id),
            ("ticketNumber", &self.ticket_number),
        ];

        for (field, value) in strings {
            if value.is_empty() {
                return Err(TokenError::InvalidField {
                    field: field.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }

        if self.quantity == 0 {
            return Err(TokenError::InvalidField {
                field: "quantity".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// The signed portion of a token. Field declaration order is the digest
/// input order and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketClaims {
    pub registration_id: String,
    pub event_id: String,
    pub user_id: String,
    pub ticket_number: String,
    pub quantity: u32,
    /// Issue time (Unix milliseconds, wall clock)
    pub timestamp: u64,
}

impl TicketClaims {
    fn from_identity(identity: &TicketIdentity, timestamp: u64) -> Self {
        Self {
            registration_id: identity.registration_id.clone(),
            event_id: identity.event_id.clone(),
            user_id: identity.user_id.clone(),
            ticket_number: identity.ticket_number.clone(),
            quantity: identity.quantity,
            timestamp,
        }
    }

    /// Compact JSON of the six data fields in fixed order.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, TokenError> {
        serde_json::to_vec(self).map_err(|e| TokenError::Serialization {
            reason: e.to_string(),
        })
    }

    /// The identity these claims were issued for.
    pub fn identity(&self) -> TicketIdentity {
        TicketIdentity {
            registration_id: self.registration_id.clone(),
            event_id: self.event_id.clone(),
            user_id: self.user_id.clone(),
            ticket_number: self.ticket_number.clone(),
            quantity: self.quantity,
        }
    }
}

/// Wire form of a token. Unknown fields are rejected so that extra data
/// cannot ride along on a valid signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct TicketToken {
    registration_id: String,
    event_id: String,
    user_id: String,
    ticket_number: String,
    quantity: u32,
    timestamp: u64,
    hash: String,
}

impl TicketToken {
    fn new(claims: TicketClaims, hash: String) -> Self {
        Self {
            registration_id: claims.registration_id,
            event_id: claims.event_id,
            user_id: claims.user_id,
            ticket_number: claims.ticket_number,
            quantity: claims.quantity,
            timestamp: claims.timestamp,
            hash,
        }
    }

    fn into_parts(self) -> (TicketClaims, String) {
        let claims = TicketClaims {
            registration_id: self.registration_id,
            event_id: self.event_id,
            user_id: self.user_id,
            ticket_number: self.ticket_number,
            quantity: self.quantity,
            timestamp: self.timestamp,
        };
        (claims, self.hash)
    }
}

/// Errors produced by the codec.
///
/// [`TicketTokenCodec::verify`] collapses `Malformed` and
/// `SignatureMismatch` into `None`; [`TicketTokenCodec::inspect`] keeps them
/// apart for diagnostics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Malformed token: {reason}")]
    Malformed { reason: String },

    #[error("Token signature does not match")]
    SignatureMismatch,

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

/// Snapshot of codec counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CodecMetrics {
    pub tokens_issued_total: u64,
    pub issuance_rejected_total: u64,
    pub tokens_verified_total: u64,
    pub malformed_tokens_total: u64,
    pub signature_mismatches_total: u64,
}

#[derive(Debug, Default)]
struct Counters {
    tokens_issued: AtomicU64,
    issuance_rejected: AtomicU64,
    tokens_verified: AtomicU64,
    malformed: AtomicU64,
    mismatches: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CodecMetrics {
        CodecMetrics {
            tokens_issued_total: self.tokens_issued.load(Ordering::Relaxed),
            issuance_rejected_total: self.issuance_rejected.load(Ordering::Relaxed),
            tokens_verified_total: self.tokens_verified.load(Ordering::Relaxed),
            malformed_tokens_total: self.malformed.load(Ordering::Relaxed),
            signature_mismatches_total: self.mismatches.load(Ordering::Relaxed),
        }
    }
}

/// Computes `SHA-256(canonical || secret)`.
pub fn compute_digest(canonical: &[u8], secret: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(canonical);
    hasher.update(secret);
    hasher.finalize().into()
}

/// Current wall-clock time in Unix milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Issues and verifies ticket tokens with an injected secret.
///
/// The codec holds no mutable state apart from atomic counters, so a single
/// instance can be shared across request handlers.
#[derive(Debug)]
pub struct TicketTokenCodec {
    secret: TokenSecret,
    counters: Counters,
}

impl TicketTokenCodec {
    pub fn new(secret: TokenSecret) -> Self {
        Self {
            secret,
            counters: Counters::default(),
        }
    }

    /// Issues a token stamped with the current time.
    ///
    /// # Examples
    /// ```
    /// use turnstile_crypto::{TicketIdentity, TicketTokenCodec, TokenSecret};
    ///
    /// let codec = TicketTokenCodec::new(TokenSecret::new("test-secret").unwrap());
    /// let identity = TicketIdentity {
    ///     registration_id: "r1".to_string(),
    ///     event_id: "e1".to_string(),
    ///     user_id: "u1".to_string(),
    ///     ticket_number: "TKT-001".to_string(),
    ///     quantity: 2,
    /// };
    ///
    /// let token = codec.issue(&identity).unwrap();
    /// let claims = codec.verify(&token).unwrap();
    /// assert_eq!(claims.quantity, 2);
    /// ```
    pub fn issue(&self, identity: &TicketIdentity) -> Result<String, TokenError> {
        self.issue_at(identity, now_ms())
    }

    /// Issues a token with an explicit issue time.
    pub fn issue_at(&self, identity: &TicketIdentity, timestamp: u64) -> Result<String, TokenError> {
        if let Err(e) = identity.validate() {
            Counters::bump(&self.counters.issuance_rejected);
            return Err(e);
        }

        let claims = TicketClaims::from_identity(identity, timestamp);
        let hash = self.sign(&claims)?;
        let token = TicketToken::new(claims, hash);

        let text = serde_json::to_string(&token).map_err(|e| TokenError::Serialization {
            reason: e.to_string(),
        })?;

        Counters::bump(&self.counters.tokens_issued);

        debug!(
            registration_id = %token.registration_id,
            event_id = %token.event_id,
            quantity = token.quantity,
            "Ticket token issued"
        );

        Ok(text)
    }

    /// Verifies presented token text.
    ///
    /// Returns the recovered claims on success and `None` for anything else.
    /// The reason is logged and counted but not returned.
    pub fn verify(&self, token_text: &str) -> Option<TicketClaims> {
        self.inspect(token_text).ok()
    }

    /// Like [`verify`](Self::verify) but reports why a token was rejected.
    pub fn inspect(&self, token_text: &str) -> Result<TicketClaims, TokenError> {
        let token: TicketToken = match serde_json::from_str(token_text) {
            Ok(token) => token,
            Err(e) => {
                Counters::bump(&self.counters.malformed);
                debug!(error = %e, "Rejected malformed ticket token");
                return Err(TokenError::Malformed {
                    reason: e.to_string(),
                });
            }
        };

        let (claims, presented) = token.into_parts();
        let expected = self.sign(&claims)?;

        if !constant_time_eq::constant_time_eq(expected.as_bytes(), presented.as_bytes()) {
            Counters::bump(&self.counters.mismatches);
            warn!(
                registration_id = %claims.registration_id,
                event_id = %claims.event_id,
                "Ticket token signature mismatch"
            );
            return Err(TokenError::SignatureMismatch);
        }

        Counters::bump(&self.counters.tokens_verified);
        Ok(claims)
    }

    pub fn metrics(&self) -> CodecMetrics {
        self.counters.snapshot()
    }

    fn sign(&self, claims: &TicketClaims) -> Result<String, TokenError> {
        let canonical = claims.canonical_bytes()?;
        Ok(hex::encode(compute_digest(&canonical, self.secret.as_bytes())))
    }
}
