//! Sub-merchant onboarding
//!
//! Reads a merchant account application from a JSON file and submits it to
//! the payment gateway configured in the environment.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_core::{CheckoutWorkflow, MerchantAccountRequest, WorkflowConfig};
use checkout_gateway::HttpGateway;

#[derive(Parser, Debug)]
#[command(name = "register-merchant", version, about = "Create a sub-merchant account")]
struct Args {
    /// JSON file with the merchant account application
    payload: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.payload)
        .with_context(|| format!("reading {}", args.payload.display()))?;
    let request: MerchantAccountRequest = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", args.payload.display()))?;

    let gateway = HttpGateway::from_env().context("gateway credentials")?;
    let workflow = CheckoutWorkflow::new(Arc::new(gateway), WorkflowConfig::default());

    let result = workflow.register_merchant(&request).await?;

    println!("{}", result.message);
    if let Some(account) = &result.merchant_account {
        println!("{} ({:?})", account.id, account.status);
    }

    if !result.success {
        anyhow::bail!("merchant account was not created");
    }

    Ok(())
}
