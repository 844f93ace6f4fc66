//! # checkout-core
//!
//! Checkout workflow and payment gateway contract for gateway-checkout.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐     ┌──────────────────┐     ┌────────────────────┐
//! │  Router  │────▶│ CheckoutWorkflow │────▶│  PaymentGateway    │
//! │  (axum)  │◀────│  (navigation)    │◀────│  (HTTP / Mock)     │
//! └──────────┘     └──────────────────┘     └────────────────────┘
//! ```
//!
//! All payment logic (risk, settlement, validation rules) lives in the
//! gateway. The workflow only pairs a nonce with an amount, submits the sale
//! and decides where the browser goes next.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use checkout_core::{CheckoutWorkflow, MockGateway, WorkflowConfig};
//!
//! let workflow = CheckoutWorkflow::new(Arc::new(MockGateway::new()), WorkflowConfig::default());
//!
//! let nav = workflow.submit_checkout("10.00", "fake-valid-nonce").await?;
//! // Redirect to: nav.location()
//! ```

pub mod amount;
pub mod error;
pub mod gateway;
pub mod marketplace;
pub mod merchant;
pub mod transaction;
pub mod workflow;

pub use amount::{InvalidAmount, parse_amount, to_decimal};
pub use error::{CheckoutError, Result};
pub use gateway::{GatewayCall, MockGateway, PaymentGateway};
pub use marketplace::{MarketplaceConfig, SaleReport};
pub use merchant::{MerchantAccountRequest, MerchantAccountResult};
pub use transaction::{
    CreditCard, Customer, SaleRequest, Transaction, TransactionResult, TransactionStatus,
    ValidationError,
};
pub use workflow::{
    CheckoutForm, CheckoutWorkflow, Flash, Navigation, TransactionLookup, TransactionView,
    WorkflowConfig,
};
