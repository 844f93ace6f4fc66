//! Transaction Types
//!
//! Read-only projections of gateway objects plus the sale request and its
//! tagged result.

use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settlement status of a transaction, as reported by the gateway
///
/// Statuses the gateway may add later are kept verbatim in [`TransactionStatus::Unknown`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionStatus {
    AuthorizationExpired,
    Authorized,
    Authorizing,
    SettlementPending,
    SettlementDeclined,
    Failed,
    GatewayRejected,
    ProcessorDeclined,
    Settled,
    Settling,
    SubmittedForSettlement,
    Voided,
    Unrecognized,
    SettlementConfirmed,
    Unknown(String),
}

/// Statuses displayed as a successful checkout
pub const SUCCESS_STATUSES: [TransactionStatus; 7] = [
    TransactionStatus::Authorized,
    TransactionStatus::Authorizing,
    TransactionStatus::Settled,
    TransactionStatus::SettlementConfirmed,
    TransactionStatus::SettlementPending,
    TransactionStatus::Settling,
    TransactionStatus::SubmittedForSettlement,
];

impl TransactionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::AuthorizationExpired => "authorization_expired",
            Self::Authorized => "authorized",
            Self::Authorizing => "authorizing",
            Self::SettlementPending => "settlement_pending",
            Self::SettlementDeclined => "settlement_declined",
            Self::Failed => "failed",
            Self::GatewayRejected => "gateway_rejected",
            Self::ProcessorDeclined => "processor_declined",
            Self::Settled => "settled",
            Self::Settling => "settling",
            Self::SubmittedForSettlement => "submitted_for_settlement",
            Self::Voided => "voided",
            Self::Unrecognized => "unrecognized",
            Self::SettlementConfirmed => "settlement_confirmed",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "authorization_expired" => Self::AuthorizationExpired,
            "authorized" => Self::Authorized,
            "authorizing" => Self::Authorizing,
            "settlement_pending" => Self::SettlementPending,
            "settlement_declined" => Self::SettlementDeclined,
            "failed" => Self::Failed,
            "gateway_rejected" => Self::GatewayRejected,
            "processor_declined" => Self::ProcessorDeclined,
            "settled" => Self::Settled,
            "settling" => Self::Settling,
            "submitted_for_settlement" => Self::SubmittedForSettlement,
            "voided" => Self::Voided,
            "unrecognized" => Self::Unrecognized,
            "settlement_confirmed" => Self::SettlementConfirmed,
            _ => Self::Unknown(s.to_string()),
        }
    }

    /// True iff the status is one of [`SUCCESS_STATUSES`]
    pub fn is_success(&self) -> bool {
        SUCCESS_STATUSES.contains(self)
    }
}

impl From<String> for TransactionStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<TransactionStatus> for String {
    fn from(status: TransactionStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card details attached to a transaction
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub bin: Option<String>,
    #[serde(default)]
    pub last_4: Option<String>,
    #[serde(default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub expiration_month: Option<String>,
    #[serde(default)]
    pub expiration_year: Option<String>,
    #[serde(default)]
    pub cardholder_name: Option<String>,
    #[serde(default)]
    pub customer_location: Option<String>,
}

impl CreditCard {
    /// `411111******1111` style number, if bin and last four are known
    pub fn masked_number(&self) -> Option<String> {
        match (&self.bin, &self.last_4) {
            (Some(bin), Some(last_4)) => Some(format!("{bin}******{last_4}")),
            _ => None,
        }
    }

    /// `MM/YYYY`, if both parts are known
    pub fn expiration_date(&self) -> Option<String> {
        match (&self.expiration_month, &self.expiration_year) {
            (Some(month), Some(year)) => Some(format!("{month}/{year}")),
            _ => None,
        }
    }
}

/// Customer attached to a transaction
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// A transaction as seen through the gateway
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub status: TransactionStatus,
    pub amount: Decimal,
    #[serde(default)]
    pub currency_iso_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub credit_card: Option<CreditCard>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub tax_amount: Option<Decimal>,
    #[serde(default)]
    pub authorized_transaction_id: Option<String>,
    #[serde(default)]
    pub avs_error_response_code: Option<String>,
    #[serde(default)]
    pub avs_postal_code_response_code: Option<String>,
    #[serde(default)]
    pub avs_street_address_response_code: Option<String>,
    #[serde(default)]
    pub cvv_response_code: Option<String>,
    #[serde(default)]
    pub processor_response_code: Option<String>,
    #[serde(default)]
    pub processor_response_text: Option<String>,
    #[serde(default)]
    pub merchant_account_id: Option<String>,
    #[serde(default)]
    pub service_fee_amount: Option<Decimal>,
}

impl Transaction {
    /// Minimal transaction with every optional field empty
    pub fn new(id: impl Into<String>, status: TransactionStatus, amount: Decimal) -> Self {
        Self {
            id: id.into(),
            status,
            amount,
            currency_iso_code: None,
            created_at: None,
            credit_card: None,
            customer: None,
            tax_amount: None,
            authorized_transaction_id: None,
            avs_error_response_code: None,
            avs_postal_code_response_code: None,
            avs_street_address_response_code: None,
            cvv_response_code: None,
            processor_response_code: None,
            processor_response_text: None,
            merchant_account_id: None,
            service_fee_amount: None,
        }
    }
}

/// Sale options
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleOptions {
    pub submit_for_settlement: bool,
    #[serde(default)]
    pub hold_in_escrow: bool,
}

/// Statement descriptor shown on the buyer's card statement
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
}

/// Request to create a sale
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRequest {
    pub amount: BigDecimal,
    pub payment_method_nonce: String,
    pub options: SaleOptions,

    /// Sub-merchant receiving the funds (marketplace sales)
    #[serde(default)]
    pub merchant_account_id: Option<String>,

    /// Marketplace fee withheld from the sub-merchant
    #[serde(default)]
    pub service_fee_amount: Option<BigDecimal>,

    #[serde(default)]
    pub descriptor: Option<Descriptor>,

    /// Ordered name/value pairs
    #[serde(default)]
    pub custom_fields: Vec<(String, String)>,
}

impl SaleRequest {
    /// Plain checkout sale, submitted for settlement
    pub fn checkout(amount: BigDecimal, payment_method_nonce: impl Into<String>) -> Self {
        Self {
            amount,
            payment_method_nonce: payment_method_nonce.into(),
            options: SaleOptions {
                submit_for_settlement: true,
                hold_in_escrow: false,
            },
            merchant_account_id: None,
            service_fee_amount: None,
            descriptor: None,
            custom_fields: Vec::new(),
        }
    }
}

/// A single gateway validation error
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(default)]
    pub attribute: String,
    pub code: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        attribute: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}: {}", self.code, self.message)
    }
}

/// Outcome of a sale; exactly one variant per gateway response
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionResult {
    Success(Transaction),

    /// Gateway created a transaction but it did not go through (e.g. declined)
    FailureWithTransaction {
        transaction: Transaction,
        message: String,
    },

    /// Gateway refused the request before creating a transaction
    FailureNoTransaction {
        errors: Vec<ValidationError>,
        message: String,
    },
}

impl TransactionResult {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The transaction, whether or not the sale succeeded
    pub const fn transaction(&self) -> Option<&Transaction> {
        match self {
            Self::Success(transaction) | Self::FailureWithTransaction { transaction, .. } => {
                Some(transaction)
            }
            Self::FailureNoTransaction { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::FailureWithTransaction { message, .. }
            | Self::FailureNoTransaction { message, .. } => Some(message),
        }
    }
}
