//! # checkout-gateway
//!
//! HTTP payment gateway client for gateway-checkout.
//!
//! `HttpGateway` implements [`checkout_core::PaymentGateway`] over the
//! gateway's JSON API: basic auth with the public/private key pair, one
//! pooled `reqwest::Client`, no retries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use checkout_core::{CheckoutWorkflow, WorkflowConfig};
//! use checkout_gateway::HttpGateway;
//!
//! // BT_ENVIRONMENT, BT_MERCHANT_ID, BT_PUBLIC_KEY, BT_PRIVATE_KEY
//! let gateway = HttpGateway::from_env()?;
//! let workflow = CheckoutWorkflow::new(Arc::new(gateway), WorkflowConfig::default());
//! ```

pub mod config;
pub mod http;
/// Requisite masking for logged payloads
pub mod mask;
mod wire;

pub use config::{Environment, GatewayConfig};
pub use http::HttpGateway;
