//! HTTP Gateway Client
//!
//! Implementation of `PaymentGateway` over the gateway's JSON API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use checkout_core::{
    CheckoutError, MerchantAccountRequest, MerchantAccountResult, PaymentGateway, Result,
    SaleRequest, Transaction, TransactionResult,
};

use crate::config::GatewayConfig;
use crate::mask;
use crate::wire::{
    ClientTokenRequest, ClientTokenResponse, FindTransactionResponse, MerchantAccountEnvelope,
    MerchantAccountResponse, TransactionEnvelope, TransactionResponse,
};

/// Gateway API version sent with every request
const API_VERSION: &str = "6";

fn transport_error(e: reqwest::Error) -> CheckoutError {
    if e.is_decode() {
        CheckoutError::InvalidResponse(e.to_string())
    } else {
        CheckoutError::Transport(e.to_string())
    }
}

/// Ids the gateway could ever have issued; anything else cannot exist
fn is_well_formed_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Payment gateway reached over HTTPS
pub struct HttpGateway {
    client: Client,
    config: GatewayConfig,
}

impl HttpGateway {
    /// Create from configuration
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("gateway-checkout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CheckoutError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GatewayConfig::from_env()?)
    }

    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Send an authenticated request and decode the JSON body
    ///
    /// `422` carries an `api_error_response` body and is decoded like a success.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, operation: &str) -> Result<T> {
        let response = request
            .basic_auth(&self.config.public_key, Some(&self.config.private_key))
            .header(reqwest::header::ACCEPT, "application/json")
            .header("X-ApiVersion", API_VERSION)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        tracing::debug!(operation, status = status.as_u16(), "Gateway API response");

        match status {
            s if s.is_success() || s == StatusCode::UNPROCESSABLE_ENTITY => {
                let body = response.json::<serde_json::Value>().await.map_err(transport_error)?;
                tracing::trace!(operation, body = %mask::secure_value(&body), "Gateway API response body");
                Ok(serde_json::from_value(body)?)
            }
            StatusCode::UNAUTHORIZED => Err(CheckoutError::Authentication(format!(
                "{operation}: credentials rejected"
            ))),
            StatusCode::FORBIDDEN => Err(CheckoutError::Authorization(format!(
                "{operation}: not permitted"
            ))),
            StatusCode::NOT_FOUND => Err(CheckoutError::NotFound(operation.to_string())),
            StatusCode::UPGRADE_REQUIRED => Err(CheckoutError::UpgradeRequired),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(CheckoutError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn generate_client_token(&self) -> Result<String> {
        let url = self.config.merchant_url("client_token");
        tracing::debug!(%url, "Gateway API client token request");

        let request = self.client.post(&url).json(&ClientTokenRequest::default());
        let response: ClientTokenResponse = self.send(request, "client_token").await?;
        Ok(response.client_token.value)
    }

    async fn create_sale(&self, request: &SaleRequest) -> Result<TransactionResult> {
        let url = self.config.merchant_url("transactions");
        let body = TransactionEnvelope::from(request);
        tracing::debug!(%url, data = %mask::secure_serializable(&body), "Gateway API sale request");

        let response: TransactionResponse = self
            .send(self.client.post(&url).json(&body), "create_sale")
            .await?;
        response.into_result()
    }

    async fn find_transaction(&self, id: &str) -> Result<Transaction> {
        if !is_well_formed_id(id) {
            return Err(CheckoutError::NotFound(format!("transaction {id:?}")));
        }

        let url = self.config.merchant_url(&format!("transactions/{id}"));
        tracing::debug!(%url, "Gateway API find transaction request");

        let response: FindTransactionResponse = self
            .send(self.client.get(&url), "find_transaction")
            .await
            .map_err(|e| match e {
                CheckoutError::NotFound(_) => CheckoutError::NotFound(format!("transaction {id}")),
                other => other,
            })?;
        Ok(response.transaction)
    }

    async fn create_merchant_account(
        &self,
        request: &MerchantAccountRequest,
    ) -> Result<MerchantAccountResult> {
        let url = self.config.merchant_url("merchant_accounts/create_via_api");
        let body = MerchantAccountEnvelope {
            merchant_account: request,
        };
        tracing::debug!(%url, data = %mask::secure_serializable(&body), "Gateway API merchant account request");

        let response: MerchantAccountResponse = self
            .send(self.client.post(&url).json(&body), "create_merchant_account")
            .await?;
        response.into_result()
    }

    fn name(&self) -> &str {
        "HttpGateway"
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode as HttpStatus},
        routing::{get, post},
    };
    use checkout_core::TransactionStatus;
    use serde_json::{Value, json};

    use super::*;
    use crate::config::Environment;

    /// Serve `router` on an ephemeral local port and point a gateway at it
    async fn gateway_for(router: Router) -> HttpGateway {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let mut config = GatewayConfig::new(Environment::Development, "m1", "pub", "priv");
        config.base_url = Some(format!("http://{addr}"));
        config.timeout_secs = 5;
        HttpGateway::new(config).unwrap()
    }

    /// Answers every request with `status` and a plain body
    fn answering(status: u16) -> Router {
        let status = HttpStatus::from_u16(status).unwrap();
        Router::new().fallback(move || async move { (status, "stub body") })
    }

    fn sale(amount: &str) -> SaleRequest {
        SaleRequest::checkout(amount.parse().unwrap(), "fake-valid-nonce")
    }

    #[tokio::test]
    async fn test_authenticated_client_token() {
        let router = Router::new().route(
            "/merchants/m1/client_token",
            post(|headers: HeaderMap| async move {
                let api_version = headers.get("x-apiversion").and_then(|v| v.to_str().ok());
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|v| v.starts_with("Basic "));
                if api_version != Some(API_VERSION) || !authorized {
                    return (HttpStatus::UNAUTHORIZED, Json(json!({})));
                }
                (
                    HttpStatus::CREATED,
                    Json(json!({ "client_token": { "value": "token-from-stub" } })),
                )
            }),
        );
        let gateway = gateway_for(router).await;

        assert_eq!(gateway.generate_client_token().await.unwrap(), "token-from-stub");
    }

    #[tokio::test]
    async fn test_status_codes_map_to_errors() {
        let gateway = gateway_for(answering(401)).await;
        assert!(matches!(
            gateway.generate_client_token().await,
            Err(CheckoutError::Authentication(_))
        ));

        let gateway = gateway_for(answering(403)).await;
        assert!(matches!(
            gateway.generate_client_token().await,
            Err(CheckoutError::Authorization(_))
        ));

        let gateway = gateway_for(answering(404)).await;
        assert!(matches!(
            gateway.generate_client_token().await,
            Err(CheckoutError::NotFound(_))
        ));

        let gateway = gateway_for(answering(426)).await;
        assert!(matches!(
            gateway.generate_client_token().await,
            Err(CheckoutError::UpgradeRequired)
        ));

        let gateway = gateway_for(answering(503)).await;
        match gateway.create_sale(&sale("10.00")).await {
            Err(CheckoutError::UnexpectedStatus { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "stub body");
            }
            other => panic!("expected unexpected status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_retryable() {
        let gateway = gateway_for(answering(500)).await;
        let err = gateway.generate_client_token().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.is_gateway_fault());
    }

    #[tokio::test]
    async fn test_missing_transaction_names_the_id() {
        let gateway = gateway_for(answering(404)).await;
        match gateway.find_transaction("abc123").await {
            Err(CheckoutError::NotFound(what)) => assert_eq!(what, "transaction abc123"),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_found_transaction() {
        let router = Router::new().route(
            "/merchants/m1/transactions/{id}",
            get(|axum::extract::Path(id): axum::extract::Path<String>| async move {
                Json(json!({
                    "transaction": { "id": id, "status": "settled", "amount": "25.00" }
                }))
            }),
        );
        let gateway = gateway_for(router).await;

        let txn = gateway.find_transaction("abc123").await.unwrap();
        assert_eq!(txn.id, "abc123");
        assert_eq!(txn.status, TransactionStatus::Settled);
    }

    #[tokio::test]
    async fn test_unprocessable_sale_is_validation_failure() {
        let router = Router::new().route(
            "/merchants/m1/transactions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["transaction"]["amount"], "-1.00");
                (
                    HttpStatus::UNPROCESSABLE_ENTITY,
                    Json(json!({
                        "api_error_response": {
                            "message": "Amount must be greater than zero.",
                            "errors": {
                                "errors": [
                                    { "attribute": "base", "code": "91500", "message": "Top level." }
                                ],
                                "nested": [{
                                    "attribute": "transaction",
                                    "errors": {
                                        "errors": [
                                            { "attribute": "amount", "code": "81531", "message": "Amount must be greater than zero." }
                                        ],
                                        "nested": [{
                                            "attribute": "options",
                                            "errors": {
                                                "errors": [
                                                    { "attribute": "base", "code": "91508", "message": "Cannot determine payment method." }
                                                ]
                                            }
                                        }]
                                    }
                                }, {
                                    "attribute": "descriptor",
                                    "errors": {
                                        "errors": [
                                            { "attribute": "name", "code": "92201", "message": "Descriptor name is invalid." }
                                        ]
                                    }
                                }]
                            }
                        }
                    })),
                )
            }),
        );
        let gateway = gateway_for(router).await;

        match gateway.create_sale(&sale("-1.00")).await.unwrap() {
            TransactionResult::FailureNoTransaction { errors, message } => {
                let codes: Vec<_> = errors.iter().map(|e| e.code.as_str()).collect();
                assert_eq!(codes, vec!["91500", "81531", "91508", "92201"]);
                assert_eq!(message, "Amount must be greater than zero.");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_id_shape() {
        assert!(is_well_formed_id("abc123"));
        assert!(is_well_formed_id("invalid-transaction"));
        assert!(!is_well_formed_id(""));
        assert!(!is_well_formed_id("../admin"));
        assert!(!is_well_formed_id("a b"));
    }

    #[tokio::test]
    async fn test_malformed_id_never_reaches_network() {
        let mut config = GatewayConfig::new(Environment::Development, "m1", "pub", "priv");
        // Unroutable; any network attempt would surface as Transport.
        config.base_url = Some("http://127.0.0.1:9".into());
        let gateway = HttpGateway::new(config).unwrap();

        let result = gateway.find_transaction("../../etc/passwd").await;
        assert!(matches!(result, Err(CheckoutError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_transport_error() {
        let mut config = GatewayConfig::new(Environment::Development, "m1", "pub", "priv");
        config.base_url = Some("http://127.0.0.1:9".into());
        config.timeout_secs = 2;
        let gateway = HttpGateway::new(config).unwrap();

        let result = gateway.generate_client_token().await;
        assert!(matches!(result, Err(CheckoutError::Transport(_))));
    }
}
