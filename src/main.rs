//! Binary entry point: initializes tracing and configuration, prepares the
//! database, and serves the HTTP API.

use event_ledger::{config, errors::Result, http};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Initialize database
    let db = config::database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ensured."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Serve the API
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind_addr, e))?;
    info!("Listening on {}", bind_addr);

    axum::serve(listener, http::app(db)).await?;
    Ok(())
}
