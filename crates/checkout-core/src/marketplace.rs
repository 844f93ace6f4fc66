//! Marketplace Escrow Sales
//!
//! Fixed-price sales routed to a sub-merchant account with a service fee
//! withheld and funds held in escrow.

use bigdecimal::BigDecimal;

use crate::amount::parse_amount;
use crate::error::{CheckoutError, Result};
use crate::transaction::{Descriptor, SaleOptions, SaleRequest, TransactionResult};

/// Marketplace sale settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketplaceConfig {
    /// Sub-merchant receiving the funds
    pub merchant_account_id: String,

    pub amount: BigDecimal,

    /// Withheld by the master merchant
    pub service_fee_amount: BigDecimal,

    /// Dynamic descriptor shown on the buyer's statement
    pub descriptor_name: String,

    pub facility: String,
    pub season: String,
}

impl MarketplaceConfig {
    pub fn new(merchant_account_id: impl Into<String>) -> Self {
        Self {
            merchant_account_id: merchant_account_id.into(),
            amount: BigDecimal::from(10).with_scale(2),
            service_fee_amount: BigDecimal::from(1).with_scale(2),
            descriptor_name: "REG-FEE".into(),
            facility: "main".into(),
            season: "default".into(),
        }
    }

    /// Load from environment; `Ok(None)` when no sub-merchant is configured
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(merchant_account_id) = std::env::var("MARKETPLACE_MERCHANT_ACCOUNT_ID") else {
            return Ok(None);
        };

        let mut config = Self::new(merchant_account_id);

        if let Ok(raw) = std::env::var("MARKETPLACE_SALE_AMOUNT") {
            config.amount = parse_amount(&raw)
                .map_err(|e| CheckoutError::Config(format!("MARKETPLACE_SALE_AMOUNT: {e}")))?;
        }
        if let Ok(raw) = std::env::var("MARKETPLACE_SERVICE_FEE") {
            config.service_fee_amount = parse_amount(&raw)
                .map_err(|e| CheckoutError::Config(format!("MARKETPLACE_SERVICE_FEE: {e}")))?;
        }
        if let Ok(name) = std::env::var("MARKETPLACE_DESCRIPTOR") {
            config.descriptor_name = name;
        }
        if let Ok(facility) = std::env::var("MARKETPLACE_FACILITY") {
            config.facility = facility;
        }
        if let Ok(season) = std::env::var("MARKETPLACE_SEASON") {
            config.season = season;
        }

        Ok(Some(config))
    }

    /// Build the escrow sale for one buyer
    pub fn sale_request(&self, nonce: &str, request_id: &str) -> SaleRequest {
        SaleRequest {
            amount: self.amount.clone(),
            payment_method_nonce: nonce.to_string(),
            options: SaleOptions {
                submit_for_settlement: true,
                hold_in_escrow: true,
            },
            merchant_account_id: Some(self.merchant_account_id.clone()),
            service_fee_amount: Some(self.service_fee_amount.clone()),
            descriptor: Some(Descriptor {
                name: self.descriptor_name.clone(),
            }),
            custom_fields: vec![
                ("facility".into(), format!("{} {request_id}", self.facility)),
                ("season".into(), format!("{} {request_id}", self.season)),
            ],
        }
    }
}

/// Plain-text summary of a marketplace sale
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleReport {
    pub success: bool,
    pub text: String,
}

impl SaleReport {
    pub fn missing_nonce() -> Self {
        Self {
            success: false,
            text: "missing nonce...".into(),
        }
    }

    pub fn from_result(result: &TransactionResult) -> Self {
        match result {
            TransactionResult::Success(transaction) => {
                let message = transaction
                    .processor_response_text
                    .as_deref()
                    .unwrap_or("Approved");
                Self {
                    success: true,
                    text: format!("{message}...success"),
                }
            }
            TransactionResult::FailureWithTransaction { transaction, .. } => {
                let field = |v: Option<String>| v.unwrap_or_else(|| "-".into());
                let lines = [
                    format!(
                        "Tax amount: {}",
                        field(transaction.tax_amount.map(|a| a.to_string()))
                    ),
                    format!(
                        "Authorized transaction id: {}",
                        field(transaction.authorized_transaction_id.clone())
                    ),
                    format!("Status: {}", transaction.status),
                    format!(
                        "AVS error response code: {}",
                        field(transaction.avs_error_response_code.clone())
                    ),
                    format!(
                        "AVS postal code response code: {}",
                        field(transaction.avs_postal_code_response_code.clone())
                    ),
                    format!(
                        "CVV response code: {}",
                        field(transaction.cvv_response_code.clone())
                    ),
                ];
                Self {
                    success: false,
                    text: lines.join("\n"),
                }
            }
            TransactionResult::FailureNoTransaction { message, .. } => Self {
                success: false,
                text: format!("{message}...failed"),
            },
        }
    }
}
