//! Integration tests across the Turnstile crates
//!
//! This test suite validates:
//! - Token issuance and verification across independently configured codecs
//! - Door check-in through the gate router with a file-backed ledger
//! - Rejection of forged, foreign and replayed tickets

pub mod test_utils;

#[cfg(test)]
mod token_lifecycle_tests;
