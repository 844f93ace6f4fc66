//! Merchant Onboarding
//!
//! Sub-merchant account requests for marketplace setups. The payload is
//! always injected (JSON file, config); nothing here carries real identities.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, Result};

/// Postal address
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street_address: String,
    pub locality: String,
    pub region: String,
    pub postal_code: String,
}

/// The person applying for the account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub date_of_birth: NaiveDate,
    pub address: Address,
}

/// Registered business, if the applicant operates as one
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDetails {
    pub legal_name: String,
    #[serde(default)]
    pub dba_name: Option<String>,
    pub tax_id: String,
    pub address: Address,
}

/// Where disbursements are sent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingDestination {
    Bank,
    Email,
    MobilePhone,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingDetails {
    #[serde(default)]
    pub descriptor: Option<String>,
    pub destination: FundingDestination,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile_phone: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub routing_number: Option<String>,
}

/// Request to create a sub-merchant account under a master merchant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantAccountRequest {
    pub id: String,
    pub master_merchant_account_id: String,
    pub tos_accepted: bool,
    pub individual: IndividualDetails,
    #[serde(default)]
    pub business: Option<BusinessDetails>,
    pub funding: FundingDetails,
}

impl MerchantAccountRequest {
    /// Local sanity checks before anything is sent to the gateway
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(CheckoutError::InvalidMerchantRequest(msg.into()));

        if self.id.trim().is_empty() {
            return invalid("id is required");
        }
        if self.master_merchant_account_id.trim().is_empty() {
            return invalid("master_merchant_account_id is required");
        }
        if !self.tos_accepted {
            return invalid("terms of service must be accepted");
        }

        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        let funding = &self.funding;
        match funding.destination {
            FundingDestination::Bank => {
                if !filled(&funding.account_number) || !filled(&funding.routing_number) {
                    return invalid("bank funding requires account_number and routing_number");
                }
            }
            FundingDestination::Email => {
                if !filled(&funding.email) {
                    return invalid("email funding requires funding.email");
                }
            }
            FundingDestination::MobilePhone => {
                if !filled(&funding.mobile_phone) {
                    return invalid("mobile phone funding requires funding.mobile_phone");
                }
            }
        }

        Ok(())
    }
}

/// Sub-merchant account status
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantAccountStatus {
    Pending,
    Active,
    Suspended,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantAccount {
    pub id: String,
    pub status: MerchantAccountStatus,
}

/// Gateway answer to an onboarding request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantAccountResult {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub merchant_account: Option<MerchantAccount>,
}
