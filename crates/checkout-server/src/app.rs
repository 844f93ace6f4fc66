//! Router

use axum::{
    Router,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    client_token, create_checkout, health_check, marketplace_sale, new_checkout, root,
    show_checkout,
};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health_check))

        // Checkout
        .route("/", get(root))
        .route("/checkouts", get(new_checkout).post(create_checkout))
        .route(
            "/checkouts/{transaction_id}",
            get(show_checkout).post(show_checkout),
        )

        // Utilities
        .route("/token", get(client_token))
        .route("/sale", get(marketplace_sale))

        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
