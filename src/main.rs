use std::sync::Arc;

use tracing::info;
use transactions_api::{build_app, config::Config, logging, store::SqliteTransactionStore, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let store = Arc::new(SqliteTransactionStore::open(&config.database_path)?);

    let bind_socket = config.bind_socket()?;
    let app = build_app(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        database_path = %config.database_path,
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
