//! Salesdesk - CRM backend service
//!
//! Main entry point for the HTTP API.

use std::sync::Arc;

use salesdesk_api::{router, AppContext};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables from .env file
    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => warn!(error = %err, "could not load .env file"),
    }

    let config = salesdesk_infra::config::load().unwrap_or_else(|err| {
        warn!(error = %err, "falling back to default configuration");
        salesdesk_domain::Config::default()
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let ctx = Arc::new(AppContext::new(config)?);

    info!(addr = %addr, "salesdesk listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(ctx)).await?;

    Ok(())
}
