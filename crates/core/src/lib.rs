//! Core functionality for the Turnstile ticketing gate.
//!
//! This crate provides the configuration, logging, error types and the
//! check-in ledger shared by the Turnstile service and tooling.

pub mod config;
pub mod error;
pub mod logging;

#[cfg(feature = "sqlite")]
pub mod checkin;

pub use config::{Config, LedgerConfig, LoggingConfig, ServerConfig, TokenConfig};
pub use error::{CoreError, Result};

#[cfg(feature = "sqlite")]
pub use checkin::{CheckInLedger, CheckInMetrics, CheckInOutcome, CheckInRecord, LedgerError};
