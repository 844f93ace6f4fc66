//! HTTP Handlers

use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use checkout_core::{CheckoutError, TransactionLookup, workflow::CHECKOUTS_PATH};

use crate::{flash, state::AppState, views};

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub gateway: String,
    pub marketplace_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Checkout form fields; missing fields arrive empty
#[derive(Debug, Deserialize)]
pub struct CheckoutSubmission {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub payment_method_nonce: String,
}

#[derive(Debug, Deserialize)]
pub struct SaleQuery {
    #[serde(default)]
    pub nonce: Option<String>,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Generic error boundary for faults the workflow does not recover from
fn error_response(e: &CheckoutError) -> HandlerError {
    let (status, code) = match e {
        CheckoutError::Config(_) => (StatusCode::SERVICE_UNAVAILABLE, "FEATURE_DISABLED"),
        CheckoutError::InvalidMerchantRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
        e if e.is_gateway_fault() => (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };

    (
        status,
        Json(ErrorResponse {
            error: e.user_message().into(),
            code: code.into(),
        }),
    )
}

/// `302 Found` redirect
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        gateway: state.workflow.gateway().name().to_string(),
        marketplace_configured: state.workflow.config().marketplace.is_some(),
    })
}

pub async fn root() -> Response {
    found(CHECKOUTS_PATH)
}

/// Checkout form with a fresh client token
pub async fn new_checkout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), HandlerError> {
    let form = state.workflow.render_checkout_form().await.map_err(|e| {
        tracing::error!(error = %e, "Client token generation failed");
        error_response(&e)
    })?;

    let (jar, error_details) = flash::take(jar);
    Ok((jar, Html(views::checkout_form(&form, error_details.as_deref()))))
}

/// Checkout form submission
pub async fn create_checkout(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(submission): Form<CheckoutSubmission>,
) -> Result<(CookieJar, Response), HandlerError> {
    let navigation = state
        .workflow
        .submit_checkout(&submission.amount, &submission.payment_method_nonce)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Sale submission failed");
            error_response(&e)
        })?;

    let jar = match navigation.flash() {
        Some(message) => flash::set(jar, message),
        None => jar,
    };

    Ok((jar, found(&navigation.location())))
}

/// Transaction detail page; any lookup fault sends the user back to the form
pub async fn show_checkout(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Response {
    match state.workflow.show_transaction(&transaction_id).await {
        TransactionLookup::Found(view) => Html(views::transaction_detail(&view)).into_response(),
        TransactionLookup::Fault(e) => {
            tracing::warn!(%transaction_id, error = %e, "Transaction lookup failed");
            found(CHECKOUTS_PATH)
        }
    }
}

/// Client token utility page
pub async fn client_token(State(state): State<AppState>) -> Result<Html<String>, HandlerError> {
    let form = state.workflow.render_checkout_form().await.map_err(|e| {
        tracing::error!(error = %e, "Client token generation failed");
        error_response(&e)
    })?;

    Ok(Html(views::utility(&form.client_token)))
}

/// Marketplace escrow sale utility page
pub async fn marketplace_sale(
    State(state): State<AppState>,
    Query(query): Query<SaleQuery>,
) -> Result<Html<String>, HandlerError> {
    let nonce = query.nonce.unwrap_or_default();

    let report = state
        .workflow
        .submit_marketplace_sale(&nonce)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Marketplace sale failed");
            error_response(&e)
        })?;

    Ok(Html(views::utility(&report.text)))
}
