//! Payment Gateway Integration
//!
//! The adapter contract the checkout workflow talks to. Implementations own
//! all network traffic; the workflow only sees these calls.

mod mock;

pub use mock::{GatewayCall, MockGateway};

use async_trait::async_trait;

use crate::error::Result;
use crate::merchant::{MerchantAccountRequest, MerchantAccountResult};
use crate::transaction::{SaleRequest, Transaction, TransactionResult};

/// Payment gateway client trait (Strategy pattern)
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Issue a client token for the browser-side payment form
    async fn generate_client_token(&self) -> Result<String>;

    /// Submit a sale. Gateway-side declines and validation failures are
    /// reported through [`TransactionResult`], not `Err`.
    async fn create_sale(&self, request: &SaleRequest) -> Result<TransactionResult>;

    /// Look up a transaction by id. Unknown ids are `Err(NotFound)`.
    async fn find_transaction(&self, id: &str) -> Result<Transaction>;

    /// Create a sub-merchant account
    async fn create_merchant_account(
        &self,
        request: &MerchantAccountRequest,
    ) -> Result<MerchantAccountResult>;

    /// Gateway name, for logs and health output
    fn name(&self) -> &str;
}
