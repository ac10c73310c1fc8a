use thiserror::Error;
use turnstile_core::{CoreError, LedgerError};

/// Errors raised while starting the gate.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("Check-in ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
