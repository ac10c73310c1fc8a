//! Log setup for the gate service and the ticket CLI.
//!
//! Directives come from `RUST_LOG` (default `info`). Token secrets and
//! full token text are never written to the log.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const DEFAULT_DIRECTIVES: &str = "info";

fn build_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

fn install(json: bool) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let text = (!json).then(|| fmt::layer().with_target(true).with_thread_ids(true));
    let lines = json.then(|| fmt::layer().json().with_target(true).with_thread_ids(true));

    tracing_subscriber::registry()
        .with(build_filter(directives.as_deref()))
        .with(text)
        .with(lines)
        .init();
}

/// Console output for running the gate by hand.
///
/// ```no_run
/// turnstile_core::logging::init();
/// tracing::info!(registration_id = "r1", "Ticket admitted");
/// ```
pub fn init() {
    install(false);
}

/// One JSON object per line, for door deployments that ship logs.
pub fn init_json() {
    install(true);
}

pub fn init_from_config(config: &LoggingConfig) {
    install(config.json);
}
