use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use turnstile_core::{logging, Config};
use turnstile_gate::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init_from_config(&config.logging);

    let bind_addr = config.listen_addr();
    let state = Arc::new(AppState::new(config)?);
    let app = router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Turnstile gate listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
