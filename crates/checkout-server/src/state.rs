//! Application State

use checkout_core::CheckoutWorkflow;

/// Shared application state
#[derive(Clone, Debug)]
pub struct AppState {
    /// Checkout workflow bound to the configured gateway
    pub workflow: CheckoutWorkflow,
}

impl AppState {
    pub fn new(workflow: CheckoutWorkflow) -> Self {
        Self { workflow }
    }
}
