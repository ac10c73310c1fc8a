use std::sync::Mutex;
use tracing::{info, warn};
use turnstile_core::{CheckInLedger, Config};
use turnstile_crypto::{TicketTokenCodec, TokenSecret};

use crate::error::GateError;

pub struct AppState {
    pub config: Config,
    pub codec: TicketTokenCodec,
    pub ledger: Mutex<CheckInLedger>,
}

impl AppState {
    /// Loads the token secret from the configured environment variable and
    /// opens the check-in ledger.
    pub fn new(config: Config) -> Result<Self, GateError> {
        let secret = TokenSecret::from_env(&config.tokens.secret_env);
        if secret.is_fallback() {
            warn!(
                env_var = %config.tokens.secret_env,
                "Gate is running with the development token secret; tickets can be forged"
            );
        }

        let ledger = CheckInLedger::open(&config.ledger.path)?;
        info!(ledger = %config.ledger.path, "Check-in ledger ready");

        Ok(Self::with_parts(config, TicketTokenCodec::new(secret), ledger))
    }

    pub fn with_parts(config: Config, codec: TicketTokenCodec, ledger: CheckInLedger) -> Self {
        AppState {
            config,
            codec,
            ledger: Mutex::new(ledger),
        }
    }
}
