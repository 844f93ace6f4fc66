//! gateway-checkout HTTP Server
//!
//! Axum-based checkout demo: renders the payment form, submits sales to the
//! payment gateway and shows the resulting transaction.

mod app;
mod config;
mod flash;
mod handlers;
mod state;
mod views;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let server = ServerConfig::from_env();
    let workflow = config::workflow_from_env()?;

    let app = app::router(AppState::new(workflow));

    // Start server
    let listener = tokio::net::TcpListener::bind(&server.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 gateway-checkout running on http://{}", server.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /                 - Redirect to checkout form");
    tracing::info!("  GET  /checkouts        - Checkout form");
    tracing::info!("  POST /checkouts        - Submit sale");
    tracing::info!("  GET  /checkouts/{{id}}   - Transaction detail");
    tracing::info!("  GET  /token            - Client token");
    tracing::info!("  GET  /sale?nonce=      - Marketplace escrow sale");
    tracing::info!("  GET  /health           - Health check");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
