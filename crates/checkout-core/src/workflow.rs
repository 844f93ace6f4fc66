//! Checkout Workflow
//!
//! Request-scoped glue between the HTTP layer and the gateway: validate the
//! amount, submit the sale, classify the outcome and decide where the browser
//! goes next.
//!
//! ```text
//! POST /checkouts ─▶ parse amount ──bad──▶ CheckoutForm + flash 81503
//!                        │
//!                        ▼
//!                   create_sale ──▶ Success / FailureWithTransaction ─▶ TransactionDetail
//!                                └▶ FailureNoTransaction ─────────────▶ CheckoutForm + flash
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::amount::{INVALID_AMOUNT_CODE, INVALID_AMOUNT_MESSAGE, parse_amount};
use crate::error::{CheckoutError, Result};
use crate::gateway::PaymentGateway;
use crate::marketplace::{MarketplaceConfig, SaleReport};
use crate::merchant::{MerchantAccountRequest, MerchantAccountResult};
use crate::transaction::{
    CreditCard, Customer, SaleRequest, Transaction, TransactionResult, ValidationError,
};

/// Path of the checkout form
pub const CHECKOUTS_PATH: &str = "/checkouts";

/// View model for the checkout form
#[derive(Clone, Debug, Serialize)]
pub struct CheckoutForm {
    pub client_token: String,
}

/// One-shot message for the next rendered page
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub error_details: String,
}

impl Flash {
    /// `Error: <code>: <message>` per error, newline separated, in order
    pub fn from_errors(errors: &[ValidationError]) -> Self {
        let error_details = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        Self { error_details }
    }

    pub fn invalid_amount() -> Self {
        Self::from_errors(&[ValidationError::new(
            "amount",
            INVALID_AMOUNT_CODE,
            INVALID_AMOUNT_MESSAGE,
        )])
    }
}

/// Where the browser should be sent after a form submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    CheckoutForm { flash: Option<Flash> },
    TransactionDetail { transaction_id: String },
}

impl Navigation {
    /// Redirect target path
    pub fn location(&self) -> String {
        match self {
            Self::CheckoutForm { .. } => CHECKOUTS_PATH.to_string(),
            Self::TransactionDetail { transaction_id } => {
                format!("{CHECKOUTS_PATH}/{transaction_id}")
            }
        }
    }

    pub const fn flash(&self) -> Option<&Flash> {
        match self {
            Self::CheckoutForm { flash } => flash.as_ref(),
            Self::TransactionDetail { .. } => None,
        }
    }
}

/// View model for the transaction detail page
#[derive(Clone, Debug, Serialize)]
pub struct TransactionView {
    pub is_success: bool,
    pub transaction: Transaction,
    pub credit_card: Option<CreditCard>,
    pub customer: Option<Customer>,
}

impl From<Transaction> for TransactionView {
    fn from(transaction: Transaction) -> Self {
        Self {
            is_success: transaction.status.is_success(),
            credit_card: transaction.credit_card.clone(),
            customer: transaction.customer.clone(),
            transaction,
        }
    }
}

/// Outcome of a transaction lookup; never an `Err`
#[derive(Debug)]
pub enum TransactionLookup {
    Found(Box<TransactionView>),

    /// Not found, malformed id or gateway unreachable
    Fault(CheckoutError),
}

/// Workflow settings
#[derive(Clone, Debug, Default)]
pub struct WorkflowConfig {
    /// Escrow sales are disabled when `None`
    pub marketplace: Option<MarketplaceConfig>,
}

/// The checkout workflow
#[derive(Clone)]
pub struct CheckoutWorkflow {
    gateway: Arc<dyn PaymentGateway>,
    config: WorkflowConfig,
}

impl fmt::Debug for CheckoutWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutWorkflow")
            .field("gateway", &self.gateway.name())
            .field("config", &self.config)
            .finish()
    }
}

impl CheckoutWorkflow {
    pub fn new(gateway: Arc<dyn PaymentGateway>, config: WorkflowConfig) -> Self {
        Self { gateway, config }
    }

    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.gateway.as_ref()
    }

    pub const fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Fresh client token for the payment form
    pub async fn render_checkout_form(&self) -> Result<CheckoutForm> {
        let client_token = self.gateway.generate_client_token().await?;
        Ok(CheckoutForm { client_token })
    }

    /// Handle a checkout form submission
    ///
    /// Well-formed amounts are forwarded exactly as written, negative or out
    /// of range included; the gateway decides whether they are acceptable.
    pub async fn submit_checkout(&self, amount_raw: &str, nonce: &str) -> Result<Navigation> {
        let amount = match parse_amount(amount_raw) {
            Ok(amount) => amount,
            Err(e) => {
                tracing::info!(error = %e, "Rejected checkout with malformed amount");
                return Ok(Navigation::CheckoutForm {
                    flash: Some(Flash::invalid_amount()),
                });
            }
        };

        let request = SaleRequest::checkout(amount, nonce);
        let result = self.gateway.create_sale(&request).await?;

        Ok(match result {
            TransactionResult::Success(transaction) => {
                tracing::info!(
                    transaction_id = %transaction.id,
                    status = %transaction.status,
                    amount = %request.amount,
                    "Sale succeeded"
                );
                Navigation::TransactionDetail {
                    transaction_id: transaction.id,
                }
            }
            // Shown on the detail page like a success; the page renders the failure status.
            TransactionResult::FailureWithTransaction {
                transaction,
                message,
            } => {
                tracing::info!(
                    transaction_id = %transaction.id,
                    status = %transaction.status,
                    %message,
                    "Sale failed with transaction"
                );
                Navigation::TransactionDetail {
                    transaction_id: transaction.id,
                }
            }
            TransactionResult::FailureNoTransaction { errors, message } => {
                tracing::info!(errors = errors.len(), %message, "Sale rejected by gateway validation");
                Navigation::CheckoutForm {
                    flash: Some(Flash::from_errors(&errors)),
                }
            }
        })
    }

    /// Look up a transaction for the detail page
    pub async fn show_transaction(&self, transaction_id: &str) -> TransactionLookup {
        match self.gateway.find_transaction(transaction_id).await {
            Ok(transaction) => TransactionLookup::Found(Box::new(transaction.into())),
            Err(e) => TransactionLookup::Fault(e),
        }
    }

    /// Escrow sale to the configured sub-merchant
    pub async fn submit_marketplace_sale(&self, nonce: &str) -> Result<SaleReport> {
        let marketplace = self
            .config
            .marketplace
            .as_ref()
            .ok_or_else(|| CheckoutError::Config("marketplace sales are not configured".into()))?;

        if nonce.trim().is_empty() {
            return Ok(SaleReport::missing_nonce());
        }

        let request_id = Uuid::new_v4().to_string();
        let request = marketplace.sale_request(nonce, &request_id);
        let result = self.gateway.create_sale(&request).await?;

        tracing::info!(
            %request_id,
            merchant_account_id = %marketplace.merchant_account_id,
            success = result.is_success(),
            transaction_id = ?result.transaction().map(|t| &t.id),
            "Marketplace sale processed"
        );

        Ok(SaleReport::from_result(&result))
    }

    /// Submit a sub-merchant onboarding request
    pub async fn register_merchant(
        &self,
        request: &MerchantAccountRequest,
    ) -> Result<MerchantAccountResult> {
        request.validate()?;

        let result = self.gateway.create_merchant_account(request).await?;

        if result.success {
            tracing::info!(merchant_account_id = %request.id, "Merchant account created");
        } else {
            tracing::warn!(
                merchant_account_id = %request.id,
                message = %result.message,
                "Merchant account rejected"
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayCall, MockGateway};
    use crate::merchant::tests::sample_request;
    use crate::transaction::TransactionStatus;
    use bigdecimal::BigDecimal;
    use rust_decimal_macros::dec;

    fn workflow_with(gateway: Arc<MockGateway>) -> CheckoutWorkflow {
        CheckoutWorkflow::new(gateway, WorkflowConfig::default())
    }

    #[tokio::test]
    async fn test_checkout_form_has_token() {
        let gateway = Arc::new(MockGateway::new());
        let form = workflow_with(gateway.clone())
            .render_checkout_form()
            .await
            .unwrap();

        assert!(form.client_token.starts_with("mock-client-token-"));
        assert_eq!(gateway.calls(), vec![GatewayCall::GenerateClientToken]);
    }

    #[tokio::test]
    async fn test_checkout_form_propagates_gateway_fault() {
        let gateway = Arc::new(MockGateway::new());
        gateway.set_offline(true);
        let result = workflow_with(gateway).render_checkout_form().await;
        assert!(matches!(result, Err(CheckoutError::Transport(_))));
    }

    #[tokio::test]
    async fn test_malformed_amount_makes_no_gateway_call() {
        let gateway = Arc::new(MockGateway::new());
        let workflow = workflow_with(gateway.clone());

        for raw in ["not_a_valid_amount", "", "12abc", "1_0"] {
            let nav = workflow.submit_checkout(raw, "fake-valid-nonce").await.unwrap();
            assert_eq!(nav.location(), "/checkouts");
            assert_eq!(
                nav.flash().map(|f| f.error_details.as_str()),
                Some("Error: 81503: Amount is an invalid format.")
            );
        }
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_valid_amount_submits_one_sale() {
        let gateway = Arc::new(MockGateway::new());
        let nav = workflow_with(gateway.clone())
            .submit_checkout("10.00", "fake-valid-nonce")
            .await
            .unwrap();

        let sales = gateway.sales();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].amount.to_string(), "10.00");
        assert_eq!(sales[0].payment_method_nonce, "fake-valid-nonce");
        assert!(sales[0].options.submit_for_settlement);

        match nav {
            Navigation::TransactionDetail { ref transaction_id } => {
                assert_eq!(nav.location(), format!("/checkouts/{transaction_id}"));
            }
            other => panic!("expected detail redirect, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_amounts_reach_gateway_unrounded() {
        let gateway = Arc::new(MockGateway::new());
        let workflow = workflow_with(gateway.clone());

        let raws = [
            "1e100",
            "1e-30",
            "123456789012345678901234567890",
            "0.12345678901234567890123456789012",
        ];
        for raw in raws {
            let nav = workflow.submit_checkout(raw, "fake-valid-nonce").await.unwrap();
            assert_eq!(nav.location(), "/checkouts");
            let flash = nav.flash().map(|f| f.error_details.clone()).unwrap_or_default();
            assert!(flash.starts_with("Error: 815"), "unexpected flash {flash:?}");
        }

        let sales = gateway.sales();
        assert_eq!(sales.len(), raws.len());
        for (sale, raw) in sales.iter().zip(raws) {
            assert_eq!(sale.amount, raw.parse::<BigDecimal>().unwrap());
        }
        assert_eq!(
            sales[3].amount.to_string(),
            "0.12345678901234567890123456789012"
        );
    }

    #[tokio::test]
    async fn test_declined_sale_with_transaction_goes_to_detail() {
        let gateway = Arc::new(MockGateway::new());
        let nav = workflow_with(gateway.clone())
            .submit_checkout("2000.00", "fake-valid-nonce")
            .await
            .unwrap();

        let Navigation::TransactionDetail { transaction_id } = nav else {
            panic!("declined sale with a transaction should show the detail page");
        };
        let txn = gateway.find_transaction(&transaction_id).await.unwrap();
        assert_eq!(txn.status, TransactionStatus::ProcessorDeclined);
    }

    #[tokio::test]
    async fn test_negative_amount_is_passed_to_gateway() {
        let gateway = Arc::new(MockGateway::new());
        let nav = workflow_with(gateway.clone())
            .submit_checkout("-1.00", "fake-valid-nonce")
            .await
            .unwrap();

        assert_eq!(gateway.sales().len(), 1);
        assert_eq!(nav.location(), "/checkouts");
        assert_eq!(
            nav.flash().map(|f| f.error_details.as_str()),
            Some("Error: 81531: Amount must be greater than zero.")
        );
    }

    #[tokio::test]
    async fn test_sale_fault_propagates() {
        let gateway = Arc::new(MockGateway::new());
        gateway.set_offline(true);
        let result = workflow_with(gateway)
            .submit_checkout("10.00", "fake-valid-nonce")
            .await;
        assert!(matches!(result, Err(CheckoutError::Transport(_))));
    }

    #[test]
    fn test_flash_joins_errors_in_order() {
        let flash = Flash::from_errors(&[
            ValidationError::new("amount", "81502", "Amount is required."),
            ValidationError::new("base", "91508", "Cannot determine payment method."),
        ]);
        assert_eq!(
            flash.error_details,
            "Error: 81502: Amount is required.\nError: 91508: Cannot determine payment method."
        );
    }

    #[tokio::test]
    async fn test_show_existing_transaction() {
        let gateway = Arc::new(MockGateway::new());
        let mut txn = Transaction::new("abc123", TransactionStatus::Settled, dec!(25.00));
        txn.customer = Some(Customer {
            first_name: Some("Jane".into()),
            ..Default::default()
        });
        gateway.insert_transaction(txn);

        match workflow_with(gateway).show_transaction("abc123").await {
            TransactionLookup::Found(view) => {
                assert!(view.is_success);
                assert!(view.credit_card.is_none());
                assert_eq!(view.customer.and_then(|c| c.first_name).as_deref(), Some("Jane"));
            }
            TransactionLookup::Fault(e) => panic!("unexpected fault: {e}"),
        }
    }

    #[tokio::test]
    async fn test_show_failed_transaction_is_not_success() {
        let gateway = Arc::new(MockGateway::new());
        gateway.insert_transaction(Transaction::new(
            "declined",
            TransactionStatus::GatewayRejected,
            dec!(5.00),
        ));

        match workflow_with(gateway).show_transaction("declined").await {
            TransactionLookup::Found(view) => assert!(!view.is_success),
            TransactionLookup::Fault(e) => panic!("unexpected fault: {e}"),
        }
    }

    #[tokio::test]
    async fn test_lookup_faults_are_collapsed() {
        let gateway = Arc::new(MockGateway::new());
        let workflow = workflow_with(gateway.clone());

        assert!(matches!(
            workflow.show_transaction("invalid-transaction").await,
            TransactionLookup::Fault(CheckoutError::NotFound(_))
        ));

        gateway.set_offline(true);
        assert!(matches!(
            workflow.show_transaction("anything").await,
            TransactionLookup::Fault(CheckoutError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_marketplace_sale_requires_config() {
        let gateway = Arc::new(MockGateway::new());
        let result = workflow_with(gateway.clone())
            .submit_marketplace_sale("fake-valid-nonce")
            .await;
        assert!(matches!(result, Err(CheckoutError::Config(_))));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_marketplace_sale() {
        let gateway = Arc::new(MockGateway::new().with_merchant_account("sub_merchant_1"));
        let workflow = CheckoutWorkflow::new(
            gateway.clone(),
            WorkflowConfig {
                marketplace: Some(MarketplaceConfig::new("sub_merchant_1")),
            },
        );

        let missing = workflow.submit_marketplace_sale("  ").await.unwrap();
        assert_eq!(missing, SaleReport::missing_nonce());
        assert!(gateway.calls().is_empty());

        let report = workflow.submit_marketplace_sale("fake-valid-nonce").await.unwrap();
        assert!(report.success);
        assert_eq!(report.text, "Approved...success");

        let sale = &gateway.sales()[0];
        assert!(sale.options.hold_in_escrow);
        assert_eq!(
            sale.service_fee_amount.as_ref().map(ToString::to_string).as_deref(),
            Some("1.00")
        );
    }

    #[tokio::test]
    async fn test_register_merchant() {
        let gateway = Arc::new(MockGateway::new());
        let workflow = workflow_with(gateway.clone());

        let result = workflow.register_merchant(&sample_request()).await.unwrap();
        assert!(result.success);

        let mut invalid = sample_request();
        invalid.tos_accepted = false;
        let err = workflow.register_merchant(&invalid).await.unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidMerchantRequest(_)));
        assert_eq!(gateway.calls().len(), 1);
    }
}
