//! Token secret handling.
//!
//! The secret is loaded once at startup and handed to the codec by value.
//! It is zeroized when dropped and never printed.

use std::fmt;
use thiserror::Error;
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Fallback used when no secret is configured.
///
/// ⚠️ WARNING: DO NOT USE IN PRODUCTION ⚠️
///
/// Every deployment that runs on this value accepts tokens forged by anyone
/// who has read this source file.
pub const DEV_FALLBACK_SECRET: &str = "turnstile-dev-secret-change-me";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("Token secret must not be empty")]
    Empty,
}

/// Shared secret mixed into every token digest.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct TokenSecret {
    value: Vec<u8>,
    #[zeroize(skip)]
    fallback: bool,
}

impl TokenSecret {
    pub fn new(value: impl Into<String>) -> Result<Self, SecretError> {
        let value = value.into();
        if value.is_empty() {
            return Err(SecretError::Empty);
        }
        Ok(Self {
            value: value.into_bytes(),
            fallback: false,
        })
    }

    /// Reads the secret from `var`, falling back to [`DEV_FALLBACK_SECRET`]
    /// when the variable is unset or empty.
    pub fn from_env(var: &str) -> Self {
        match std::env::var(var) {
            Ok(value) if !value.is_empty() => Self {
                value: value.into_bytes(),
                fallback: false,
            },
            _ => {
                warn!(
                    env_var = var,
                    "Token secret not configured, using insecure development fallback"
                );
                Self::dev_fallback()
            }
        }
    }

    pub fn dev_fallback() -> Self {
        Self {
            value: DEV_FALLBACK_SECRET.as_bytes().to_vec(),
            fallback: true,
        }
    }

    /// True when the secret came from [`DEV_FALLBACK_SECRET`].
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.value
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSecret")
            .field("value", &"<redacted>")
            .field("fallback", &self.fallback)
            .finish()
    }
}
