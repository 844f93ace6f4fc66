//! Gateway JSON wire types and their conversion into workflow types

use checkout_core::merchant::MerchantAccount;
use checkout_core::transaction::{Descriptor, SaleOptions};
use checkout_core::{
    CheckoutError, MerchantAccountRequest, MerchantAccountResult, Result, SaleRequest, Transaction,
    TransactionResult, ValidationError,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Client token API version requested from the gateway
const CLIENT_TOKEN_VERSION: u8 = 2;

#[derive(Debug, Serialize)]
pub struct ClientTokenRequest {
    pub client_token: ClientTokenParams,
}

#[derive(Debug, Serialize)]
pub struct ClientTokenParams {
    pub version: u8,
}

impl Default for ClientTokenRequest {
    fn default() -> Self {
        Self {
            client_token: ClientTokenParams {
                version: CLIENT_TOKEN_VERSION,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClientTokenResponse {
    pub client_token: ClientTokenValue,
}

#[derive(Debug, Deserialize)]
pub struct ClientTokenValue {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionEnvelope<'a> {
    pub transaction: TransactionParams<'a>,
}

#[derive(Debug, Serialize)]
pub struct TransactionParams<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub amount: &'a BigDecimal,
    pub payment_method_nonce: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_account_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_fee_amount: Option<&'a BigDecimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<&'a Descriptor>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub custom_fields: serde_json::Map<String, serde_json::Value>,
    pub options: &'a SaleOptions,
}

impl<'a> From<&'a SaleRequest> for TransactionEnvelope<'a> {
    fn from(request: &'a SaleRequest) -> Self {
        let custom_fields = request
            .custom_fields
            .iter()
            .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
            .collect();

        Self {
            transaction: TransactionParams {
                kind: "sale",
                amount: &request.amount,
                payment_method_nonce: &request.payment_method_nonce,
                merchant_account_id: request.merchant_account_id.as_deref(),
                service_fee_amount: request.service_fee_amount.as_ref(),
                descriptor: request.descriptor.as_ref(),
                custom_fields,
                options: &request.options,
            },
        }
    }
}

/// Validation errors, nested per attribute the way the gateway groups them
#[derive(Debug, Default, Deserialize)]
pub struct ErrorTree {
    #[serde(default)]
    pub errors: Vec<ValidationError>,
    #[serde(default)]
    pub nested: Vec<NestedErrors>,
}

#[derive(Debug, Deserialize)]
pub struct NestedErrors {
    pub attribute: String,
    pub errors: ErrorTree,
}

impl ErrorTree {
    /// Depth-first: own errors, then each nested group in order
    pub fn flatten(self) -> Vec<ValidationError> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<ValidationError>) {
        out.extend(self.errors);
        for nested in self.nested {
            nested.errors.flatten_into(out);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub message: String,
    #[serde(default)]
    pub errors: ErrorTree,
    #[serde(default)]
    pub transaction: Option<Transaction>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionResponse {
    #[serde(default)]
    pub transaction: Option<Transaction>,
    #[serde(default)]
    pub api_error_response: Option<ApiErrorResponse>,
}

impl TransactionResponse {
    pub fn into_result(self) -> Result<TransactionResult> {
        match (self.transaction, self.api_error_response) {
            (_, Some(error)) => Ok(match error.transaction {
                Some(transaction) => TransactionResult::FailureWithTransaction {
                    transaction,
                    message: error.message,
                },
                None => TransactionResult::FailureNoTransaction {
                    errors: error.errors.flatten(),
                    message: error.message,
                },
            }),
            (Some(transaction), None) => Ok(TransactionResult::Success(transaction)),
            (None, None) => Err(CheckoutError::InvalidResponse(
                "sale response has neither transaction nor api_error_response".into(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FindTransactionResponse {
    pub transaction: Transaction,
}

#[derive(Debug, Serialize)]
pub struct MerchantAccountEnvelope<'a> {
    pub merchant_account: &'a MerchantAccountRequest,
}

#[derive(Debug, Deserialize)]
pub struct MerchantAccountResponse {
    #[serde(default)]
    pub merchant_account: Option<MerchantAccount>,
    #[serde(default)]
    pub api_error_response: Option<ApiErrorResponse>,
}

impl MerchantAccountResponse {
    pub fn into_result(self) -> Result<MerchantAccountResult> {
        match (self.merchant_account, self.api_error_response) {
            (_, Some(error)) => Ok(MerchantAccountResult {
                success: false,
                message: error.message,
                merchant_account: None,
            }),
            (Some(account), None) => Ok(MerchantAccountResult {
                success: true,
                message: format!("Merchant account {} created", account.id),
                merchant_account: Some(account),
            }),
            (None, None) => Err(CheckoutError::InvalidResponse(
                "merchant account response has neither merchant_account nor api_error_response"
                    .into(),
            )),
        }
    }
}
