//! Mock Payment Gateway
//!
//! For testing and demo purposes. Mirrors the gateway sandbox's test amounts
//! and nonces and keeps created transactions in memory so they can be looked
//! up again.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::PaymentGateway;
use crate::amount::{INVALID_AMOUNT_CODE, INVALID_AMOUNT_MESSAGE, to_decimal};
use crate::error::{CheckoutError, Result};
use crate::merchant::{
    MerchantAccount, MerchantAccountRequest, MerchantAccountResult, MerchantAccountStatus,
};
use crate::transaction::{
    CreditCard, SaleRequest, Transaction, TransactionResult, TransactionStatus, ValidationError,
};

/// A call received by the mock, in arrival order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayCall {
    GenerateClientToken,
    CreateSale(SaleRequest),
    FindTransaction(String),
    CreateMerchantAccount(String),
}

/// Calls kept by [`MockGateway::new`]
pub const DEFAULT_CALL_LIMIT: usize = 1_000;

/// Transactions kept by [`MockGateway::new`]
pub const DEFAULT_TRANSACTION_LIMIT: usize = 1_000;

#[derive(Default)]
struct MockState {
    calls: VecDeque<GatewayCall>,
    transactions: HashMap<String, Transaction>,
    transaction_order: VecDeque<String>,
    merchant_accounts: HashSet<String>,
    offline: bool,
}

/// In-memory gateway with sandbox-like behaviour
///
/// The call log and the transaction store are bounded; once full, the oldest
/// entries are evicted, so the mock can also back a long-running demo server.
pub struct MockGateway {
    state: Mutex<MockState>,
    call_limit: usize,
    transaction_limit: usize,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CALL_LIMIT, DEFAULT_TRANSACTION_LIMIT)
    }

    /// Mock keeping at most `call_limit` calls and `transaction_limit` transactions
    pub fn with_limits(call_limit: usize, transaction_limit: usize) -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            call_limit,
            transaction_limit,
        }
    }

    /// Pre-register a sub-merchant account usable in marketplace sales
    pub fn with_merchant_account(self, id: impl Into<String>) -> Self {
        self.state().merchant_accounts.insert(id.into());
        self
    }

    /// Make every subsequent call fail with a transport error
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Store a transaction so `find_transaction` returns it
    pub fn insert_transaction(&self, transaction: Transaction) {
        let mut state = self.state();
        self.store(&mut state, transaction);
    }

    /// Most recent calls, oldest first
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().calls.iter().cloned().collect()
    }

    /// Number of transactions currently retrievable
    pub fn transaction_count(&self) -> usize {
        self.state().transactions.len()
    }

    /// Sale requests received so far
    pub fn sales(&self) -> Vec<SaleRequest> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                GatewayCall::CreateSale(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call, failing if the gateway is simulated offline
    fn record(&self, call: GatewayCall) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        if self.call_limit > 0 {
            while state.calls.len() >= self.call_limit {
                state.calls.pop_front();
            }
            state.calls.push_back(call);
        }
        if state.offline {
            return Err(CheckoutError::Transport(
                "connection refused (mock gateway offline)".into(),
            ));
        }
        Ok(state)
    }

    /// Keep a transaction, evicting the oldest beyond the limit
    fn store(&self, state: &mut MockState, transaction: Transaction) {
        let id = transaction.id.clone();
        if state.transactions.insert(id.clone(), transaction).is_none() {
            state.transaction_order.push_back(id);
        }
        while state.transaction_order.len() > self.transaction_limit {
            if let Some(oldest) = state.transaction_order.pop_front() {
                state.transactions.remove(&oldest);
            }
        }
    }

    /// Sandbox amount checks, yielding the amount the transaction records
    fn validate_amount(amount: &BigDecimal) -> std::result::Result<Decimal, TransactionResult> {
        if *amount <= BigDecimal::from(0) {
            return Err(Self::validation_failure(
                "amount",
                "81531",
                "Amount must be greater than zero.",
            ));
        }

        let (_, scale) = amount.as_bigint_and_exponent();
        if scale > 2 {
            return Err(Self::validation_failure(
                "amount",
                INVALID_AMOUNT_CODE,
                INVALID_AMOUNT_MESSAGE,
            ));
        }

        match to_decimal(amount) {
            Some(value) if value <= dec!(99999999999.99) => Ok(value),
            _ => Err(Self::validation_failure(
                "amount",
                "81528",
                "Amount is too large.",
            )),
        }
    }

    /// Card details the sandbox associates with its fake nonces
    fn card_for_nonce(nonce: &str) -> CreditCard {
        let (bin, last_4, card_type) = match nonce {
            "fake-valid-mastercard-nonce" => ("555555", "4444", "MasterCard"),
            "fake-valid-amex-nonce" => ("378282", "0005", "American Express"),
            "fake-valid-discover-nonce" => ("601111", "1117", "Discover"),
            _ => ("411111", "1111", "Visa"),
        };

        CreditCard {
            token: None,
            bin: Some(bin.into()),
            last_4: Some(last_4.into()),
            card_type: Some(card_type.into()),
            expiration_month: Some("12".into()),
            expiration_year: Some("2030".into()),
            cardholder_name: None,
            customer_location: Some("US".into()),
        }
    }

    /// Processor outcome for the sandbox's magic amounts
    fn processor_response(amount: Decimal) -> (TransactionStatus, &'static str, &'static str) {
        if (dec!(2000.00)..dec!(3000.00)).contains(&amount) {
            let text = if amount.trunc() == dec!(2000) {
                "Do Not Honor"
            } else {
                "Processor Declined"
            };
            (TransactionStatus::ProcessorDeclined, "2000", text)
        } else if (dec!(3000.00)..dec!(3001.00)).contains(&amount) {
            (
                TransactionStatus::Failed,
                "3000",
                "Processor Network Unavailable - Try Again",
            )
        } else {
            (TransactionStatus::SubmittedForSettlement, "1000", "Approved")
        }
    }

    fn validation_failure(attribute: &str, code: &str, message: &str) -> TransactionResult {
        TransactionResult::FailureNoTransaction {
            errors: vec![ValidationError::new(attribute, code, message)],
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn generate_client_token(&self) -> Result<String> {
        drop(self.record(GatewayCall::GenerateClientToken)?);
        Ok(format!("mock-client-token-{}", Uuid::new_v4().simple()))
    }

    async fn create_sale(&self, request: &SaleRequest) -> Result<TransactionResult> {
        let mut state = self.record(GatewayCall::CreateSale(request.clone()))?;

        let amount = match Self::validate_amount(&request.amount) {
            Ok(amount) => amount,
            Err(failure) => return Ok(failure),
        };
        if request.payment_method_nonce.trim().is_empty() {
            return Ok(Self::validation_failure(
                "base",
                "91508",
                "Cannot determine payment method.",
            ));
        }
        if let Some(ref account) = request.merchant_account_id {
            if !state.merchant_accounts.contains(account) {
                return Ok(Self::validation_failure(
                    "merchant_account_id",
                    "91513",
                    "Merchant account ID is invalid.",
                ));
            }
        }

        let (mut status, code, text) = Self::processor_response(amount);
        if status == TransactionStatus::SubmittedForSettlement && !request.options.submit_for_settlement
        {
            status = TransactionStatus::Authorized;
        }

        let id = Uuid::new_v4().simple().to_string()[..8].to_string();
        let mut transaction = Transaction::new(id, status.clone(), amount);
        transaction.currency_iso_code = Some("USD".into());
        transaction.created_at = Some(Utc::now());
        transaction.credit_card = Some(Self::card_for_nonce(&request.payment_method_nonce));
        transaction.avs_postal_code_response_code = Some("M".into());
        transaction.avs_street_address_response_code = Some("M".into());
        transaction.cvv_response_code = Some("M".into());
        transaction.processor_response_code = Some(code.into());
        transaction.processor_response_text = Some(text.into());
        transaction.merchant_account_id = request.merchant_account_id.clone();
        transaction.service_fee_amount = request.service_fee_amount.as_ref().and_then(to_decimal);

        self.store(&mut state, transaction.clone());

        tracing::debug!(transaction_id = %transaction.id, %status, "Mock gateway created transaction");

        if status.is_success() {
            Ok(TransactionResult::Success(transaction))
        } else {
            Ok(TransactionResult::FailureWithTransaction {
                transaction,
                message: text.to_string(),
            })
        }
    }

    async fn find_transaction(&self, id: &str) -> Result<Transaction> {
        let state = self.record(GatewayCall::FindTransaction(id.to_string()))?;
        state
            .transactions
            .get(id)
            .cloned()
            .ok_or_else(|| CheckoutError::NotFound(format!("transaction {id}")))
    }

    async fn create_merchant_account(
        &self,
        request: &MerchantAccountRequest,
    ) -> Result<MerchantAccountResult> {
        let mut state = self.record(GatewayCall::CreateMerchantAccount(request.id.clone()))?;

        if !state.merchant_accounts.insert(request.id.clone()) {
            return Ok(MerchantAccountResult {
                success: false,
                message: "Id has already been taken.".into(),
                merchant_account: None,
            });
        }

        Ok(MerchantAccountResult {
            success: true,
            message: "Merchant account created".into(),
            merchant_account: Some(MerchantAccount {
                id: request.id.clone(),
                status: MerchantAccountStatus::Pending,
            }),
        })
    }

    fn name(&self) -> &str {
        "MockGateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merchant::tests::sample_request;

    fn sale(amount: &str) -> SaleRequest {
        SaleRequest::checkout(amount.parse().unwrap(), "fake-valid-nonce")
    }

    async fn rejection_code(gateway: &MockGateway, amount: &str) -> String {
        match gateway.create_sale(&sale(amount)).await.unwrap() {
            TransactionResult::FailureNoTransaction { errors, .. } => errors[0].code.clone(),
            other => panic!("expected validation failure for {amount}, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_successful_sale_is_retrievable() {
        let gateway = MockGateway::new();
        let result = gateway
            .create_sale(&sale("10.00"))
            .await
            .unwrap();

        let txn = match result {
            TransactionResult::Success(txn) => txn,
            other => panic!("expected success, got {other:?}"),
        };
        assert_eq!(txn.status, TransactionStatus::SubmittedForSettlement);

        let found = gateway.find_transaction(&txn.id).await.unwrap();
        assert_eq!(found, txn);
        assert_eq!(gateway.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_declined_amount_carries_transaction() {
        let gateway = MockGateway::new();
        let result = gateway
            .create_sale(&sale("2000.00"))
            .await
            .unwrap();

        match result {
            TransactionResult::FailureWithTransaction { transaction, message } => {
                assert_eq!(transaction.status, TransactionStatus::ProcessorDeclined);
                assert_eq!(message, "Do Not Honor");
            }
            other => panic!("expected declined transaction, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_positive_amount_fails_validation() {
        let gateway = MockGateway::new();
        let result = gateway
            .create_sale(&sale("-1.00"))
            .await
            .unwrap();

        match result {
            TransactionResult::FailureNoTransaction { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].code, "81531");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let gateway = MockGateway::new();
        let result = gateway.find_transaction("invalid-transaction").await;
        assert!(matches!(result, Err(CheckoutError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_offline_gateway() {
        let gateway = MockGateway::new();
        gateway.set_offline(true);
        let result = gateway.generate_client_token().await;
        assert!(matches!(result, Err(CheckoutError::Transport(_))));
        assert_eq!(gateway.calls(), vec![GatewayCall::GenerateClientToken]);
    }

    #[tokio::test]
    async fn test_duplicate_merchant_account() {
        let gateway = MockGateway::new();
        let request = sample_request();

        let first = gateway.create_merchant_account(&request).await.unwrap();
        assert!(first.success);

        let second = gateway.create_merchant_account(&request).await.unwrap();
        assert!(!second.success);
        assert_eq!(second.message, "Id has already been taken.");
    }

    #[tokio::test]
    async fn test_out_of_range_amounts_are_rejected_by_gateway() {
        let gateway = MockGateway::new();

        assert_eq!(rejection_code(&gateway, "1e100").await, "81528");
        assert_eq!(rejection_code(&gateway, "123456789012345678901234567890").await, "81528");
        assert_eq!(rejection_code(&gateway, "1e-30").await, "81503");
        assert_eq!(
            rejection_code(&gateway, "0.12345678901234567890123456789012").await,
            "81503"
        );

        assert_eq!(gateway.sales().len(), 4);
        assert_eq!(gateway.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_exponent_amount_is_accepted() {
        let gateway = MockGateway::new();
        match gateway.create_sale(&sale("1e3")).await.unwrap() {
            TransactionResult::Success(txn) => assert_eq!(txn.amount, dec!(1000)),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_call_log_and_store_are_bounded() {
        let gateway = MockGateway::with_limits(4, 2);

        let mut ids = Vec::new();
        for _ in 0..50 {
            gateway.generate_client_token().await.unwrap();
            let result = gateway.create_sale(&sale("10.00")).await.unwrap();
            if let Some(txn) = result.transaction() {
                ids.push(txn.id.clone());
            }
        }

        assert_eq!(gateway.calls().len(), 4);
        assert_eq!(gateway.transaction_count(), 2);
        assert!(matches!(gateway.calls().last(), Some(GatewayCall::CreateSale(_))));

        // Only the newest transactions are still retrievable.
        let newest = ids.last().unwrap();
        assert!(gateway.find_transaction(newest).await.is_ok());
        assert!(matches!(
            gateway.find_transaction(&ids[0]).await,
            Err(CheckoutError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_default_limits_hold_under_sustained_traffic() {
        let gateway = MockGateway::new();
        for _ in 0..(DEFAULT_CALL_LIMIT * 2) {
            gateway.create_sale(&sale("10.00")).await.unwrap();
        }
        assert_eq!(gateway.calls().len(), DEFAULT_CALL_LIMIT);
        assert_eq!(gateway.transaction_count(), DEFAULT_TRANSACTION_LIMIT);
    }
}
