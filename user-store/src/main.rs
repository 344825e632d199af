//! user-store service binary
//!
//! Listens on port 3000 unless configured otherwise (`USER_STORE_SERVICE__PORT`
//! or `[service] port` in config.toml).

use user_store::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config)?;

    tracing::info!("Starting user store service");

    let state = AppState::new(config.clone());
    tracing::info!(
        users = state.users().len().await,
        id_strategy = ?config.store.id_strategy,
        "User store initialized"
    );

    Server::new(config).serve(state).await?;

    Ok(())
}
