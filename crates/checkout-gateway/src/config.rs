//! Gateway Configuration

use std::fmt;

use checkout_core::{CheckoutError, Result};

/// Gateway environment; selects the API host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Sandbox,
    Production,
}

impl Environment {
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Development => "http://localhost:3000",
            Self::Sandbox => "https://api.sandbox.braintreegateway.com",
            Self::Production => "https://api.braintreegateway.com",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "sandbox" => Some(Self::Sandbox),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

/// Gateway API credentials and transport settings
#[derive(Clone)]
pub struct GatewayConfig {
    pub environment: Environment,
    pub merchant_id: String,
    pub public_key: String,
    pub private_key: String,

    /// Overrides the environment's host (e.g. a local stub)
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

// Keeps the private key out of logs.
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("environment", &self.environment)
            .field("merchant_id", &self.merchant_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GatewayConfig {
    pub fn new(
        environment: Environment,
        merchant_id: impl Into<String>,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            environment,
            merchant_id: merchant_id.into(),
            public_key: public_key.into(),
            private_key: private_key.into(),
            base_url: None,
            timeout_secs: 60,
        }
    }

    /// Create from environment variables
    ///
    /// `BT_ENVIRONMENT`, `BT_MERCHANT_ID`, `BT_PUBLIC_KEY` and `BT_PRIVATE_KEY`
    /// are required; `BT_BASE_URL` and `BT_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| CheckoutError::Config(format!("{name} not set")))
        };

        let environment_name = var("BT_ENVIRONMENT")?;
        let environment = Environment::parse(&environment_name).ok_or_else(|| {
            CheckoutError::Config(format!("BT_ENVIRONMENT: unknown environment {environment_name:?}"))
        })?;

        let mut config = Self::new(
            environment,
            var("BT_MERCHANT_ID")?,
            var("BT_PUBLIC_KEY")?,
            var("BT_PRIVATE_KEY")?,
        );

        config.base_url = std::env::var("BT_BASE_URL").ok();
        if let Ok(raw) = std::env::var("BT_TIMEOUT_SECS") {
            config.timeout_secs = raw
                .parse()
                .map_err(|_| CheckoutError::Config(format!("BT_TIMEOUT_SECS: invalid value {raw:?}")))?;
        }

        Ok(config)
    }

    /// API host without trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
    }

    /// `{base}/merchants/{merchant_id}/{path}`
    pub fn merchant_url(&self, path: &str) -> String {
        format!("{}/merchants/{}/{}", self.base_url(), self.merchant_id, path)
    }
}
