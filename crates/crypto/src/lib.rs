//! Ticket token primitives for Turnstile.
//!
//! This crate issues and verifies the signed tokens that are printed on
//! tickets (usually as a QR code) and scanned at the door.
//!
//! # Core Capabilities
//!
//! - **Token issuance**: bind a registration's identity to a keyed SHA-256 digest
//! - **Token verification**: recover the identity from presented text, or reject it
//! - **Secret handling**: injected, zeroized, never logged
//! - **Ticket numbers**: human-readable identifiers printed next to the code
//!
//! # Security Principles
//!
//! - The secret is injected into the codec, never read from a global
//! - Digest input order is fixed by a record type and pinned by test vectors
//! - Digest comparison is constant-time
//! - Tokens are self-contained; nothing is stored at issuance

pub mod secret;
pub mod ticket_number;
pub mod token;

#[cfg(test)]
mod test_vectors;

pub use secret::{SecretError, TokenSecret, DEV_FALLBACK_SECRET};

pub use ticket_number::{generate_ticket_number, is_well_formed as is_well_formed_ticket_number};

pub use token::{
    compute_digest, now_ms, CodecMetrics, TicketClaims, TicketIdentity, TicketTokenCodec,
    TokenError, HASH_HEX_LEN,
};
