//! Cart-page delivery quote.
//!
//! The cart page estimates the fee per item weight, or shows an admin's
//! override. The checkout always charges the weight-tier fee.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::errors::ValidationIssue;
use shopfront_core::pricing::{CheckoutTotals, PricingPolicy, PricingSurface, cart_in_range};
use shopfront_core::settings::DeliverySettings;
use shopfront_sdk::objects::{CartItem, CustomerRole};
use tracing::warn;

use crate::api::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct QuoteRequest {
    items: Vec<CartItem>,
    #[serde(default)]
    role: CustomerRole,
    #[serde(default)]
    surface: PricingSurface,
    #[serde(default)]
    admin_override: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct QuoteResponse {
    policy: &'static str,
    totals: CheckoutTotals,
}

/// `POST /api/v1/quote`
pub(super) async fn quote(
    State(state): State<AppState>,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    if !cart_in_range(&body.items) {
        return Err(ApiError::Checkout(ValidationIssue::CartOutOfRange.into()));
    }
    let fallback = state.checkout_config.snapshot().fallback_settings.clone();
    let settings = match state.directory.delivery_settings().await {
        Ok(payload) => DeliverySettings::from_payload(payload, &fallback),
        Err(e) => {
            warn!(error = %e, "Delivery settings unavailable for quote, using defaults");
            fallback
        }
    };

    let policy = PricingPolicy::for_surface(body.role, body.surface, body.admin_override);
    let totals =
        CheckoutTotals::compute_with(&policy, &body.items, &settings, Decimal::ZERO, false);

    Ok(Json(QuoteResponse {
        policy: policy.name(),
        totals,
    }))
}
