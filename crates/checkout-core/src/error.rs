//! Checkout Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Errors raised by the gateway adapter and the checkout workflow
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Network-level failure talking to the gateway (connect, timeout, TLS)
    #[error("Gateway transport error: {0}")]
    Transport(String),

    /// Gateway rejected the API credentials
    #[error("Gateway authentication failed: {0}")]
    Authentication(String),

    /// Credentials are valid but not allowed to perform the operation
    #[error("Gateway authorization failed: {0}")]
    Authorization(String),

    /// Requested resource does not exist (or the id is malformed)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Gateway refuses this client/API version
    #[error("Gateway client upgrade required")]
    UpgradeRequired,

    /// Any other non-success HTTP status
    #[error("Unexpected gateway status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Response could not be understood
    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    /// Merchant onboarding payload failed local checks
    #[error("Invalid merchant account request: {0}")]
    InvalidMerchantRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl CheckoutError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether the failure came from talking to the gateway (as opposed to local input)
    pub const fn is_gateway_fault(&self) -> bool {
        !matches!(
            self,
            Self::InvalidMerchantRequest(_) | Self::Config(_) | Self::Json(_)
        )
    }

    /// Get user-friendly message
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Transport(_) | Self::UnexpectedStatus { .. } => {
                "The payment gateway is currently unavailable. Please try again."
            }
            Self::Authentication(_) | Self::Authorization(_) => {
                "The payment gateway rejected our credentials."
            }
            Self::NotFound(_) => "The requested record was not found.",
            Self::UpgradeRequired => "The payment gateway client must be upgraded.",
            Self::InvalidMerchantRequest(_) => "The merchant account request is incomplete.",
            Self::Config(_) => "Service configuration error.",
            _ => "An error occurred processing your request.",
        }
    }
}

impl From<anyhow::Error> for CheckoutError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(CheckoutError::Transport("timeout".into()).is_retryable());
        assert!(
            CheckoutError::UnexpectedStatus {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!CheckoutError::NotFound("txn".into()).is_retryable());
        assert!(!CheckoutError::Authentication("bad key".into()).is_retryable());
    }

    #[test]
    fn test_local_errors_are_not_gateway_faults() {
        assert!(!CheckoutError::Config("missing".into()).is_gateway_fault());
        assert!(CheckoutError::NotFound("txn".into()).is_gateway_fault());
    }
}
