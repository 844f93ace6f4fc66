//! Server Configuration

use std::sync::Arc;

use checkout_core::{
    CheckoutWorkflow, MarketplaceConfig, MockGateway, PaymentGateway, WorkflowConfig,
};
use checkout_gateway::HttpGateway;

/// Listener settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
        }
    }
}

/// Gateway selected from the environment
///
/// Without `BT_MERCHANT_ID` the in-memory gateway is used. Partial
/// credentials are an error.
pub fn gateway_from_env() -> anyhow::Result<Arc<dyn PaymentGateway>> {
    if std::env::var("BT_MERCHANT_ID").is_err() {
        tracing::warn!("⚠ Gateway credentials not configured - using mock gateway");
        tracing::warn!("  Set BT_ENVIRONMENT, BT_MERCHANT_ID, BT_PUBLIC_KEY and BT_PRIVATE_KEY in .env");
        return Ok(Arc::new(MockGateway::new()));
    }

    let gateway = HttpGateway::from_env()?;
    tracing::info!(
        environment = ?gateway.config().environment,
        base_url = %gateway.config().base_url(),
        "✓ Gateway configured"
    );
    Ok(Arc::new(gateway))
}

/// Checkout workflow wired to the configured gateway
pub fn workflow_from_env() -> anyhow::Result<CheckoutWorkflow> {
    let gateway = gateway_from_env()?;

    let marketplace = MarketplaceConfig::from_env()?;
    match &marketplace {
        Some(m) => tracing::info!(merchant_account_id = %m.merchant_account_id, "✓ Marketplace sales enabled"),
        None => tracing::info!("Marketplace sales disabled (MARKETPLACE_MERCHANT_ACCOUNT_ID not set)"),
    }

    Ok(CheckoutWorkflow::new(gateway, WorkflowConfig { marketplace }))
}
