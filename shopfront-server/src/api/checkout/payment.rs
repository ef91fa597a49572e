use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use shopfront_core::orchestrator::{PlacementOutcome, VerificationOutcome};
use shopfront_sdk::signature::{RETURN_SIGNATURE_PARAM, sign_checkout_return};
use tracing::warn;
use url::Url;
use uuid::Uuid;

use crate::api::ApiError;
use crate::api::extractors::{LiveSession, SignedReturn};
use crate::config::runtime::ServerConfig;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub(super) struct PlaceOrderRequest {
    /// Accept a delivery slot that is already full.
    #[serde(default)]
    force: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReferenceBody {
    reference: String,
}

#[derive(Debug, Serialize)]
pub(super) struct OverlayClosedResponse {
    scheduled: bool,
}

/// Signed URL the hosted payment page sends the shopper back to.
pub(crate) fn return_url(config: &ServerConfig, checkout_id: Uuid) -> Option<Url> {
    let path = format!("api/v1/checkout/{checkout_id}/return");
    let mut url = match config.public_url.join(&path) {
        Ok(url) => url,
        Err(e) => {
            warn!(%checkout_id, error = %e, "Could not build payment return URL");
            return None;
        }
    };
    let sig = sign_checkout_return(&checkout_id.to_string(), config.return_secret_bytes());
    url.set_query(Some(&format!(
        "{RETURN_SIGNATURE_PARAM}={}",
        urlencoding::encode(&sig)
    )));
    Some(url)
}

/// `POST /{id}/orders`
pub(super) async fn place_order(
    State(state): State<AppState>,
    live: LiveSession,
    body: Option<Json<PlaceOrderRequest>>,
) -> Result<Json<PlacementOutcome>, ApiError> {
    let Json(body) = body.unwrap_or_default();
    let callback_url = return_url(&state.server_config.snapshot(), live.id);
    let outcome = state
        .orchestrator
        .place_order(&live.handle, body.force, callback_url)
        .await?;
    Ok(Json(outcome))
}

/// `POST /{id}/payment/callback`
pub(super) async fn payment_callback(
    State(state): State<AppState>,
    live: LiveSession,
    Json(body): Json<ReferenceBody>,
) -> Result<Json<VerificationOutcome>, ApiError> {
    let outcome = state
        .orchestrator
        .payment_callback(&live.handle, &body.reference)
        .await?;
    Ok(Json(outcome))
}

/// `POST /{id}/payment/closed`
pub(super) async fn overlay_closed(
    State(state): State<AppState>,
    live: LiveSession,
    Json(body): Json<ReferenceBody>,
) -> impl IntoResponse {
    let scheduled = state
        .orchestrator
        .overlay_closed(&live.handle, &body.reference)
        .await;
    (StatusCode::ACCEPTED, Json(OverlayClosedResponse { scheduled }))
}

/// `GET|POST /{id}/return?sig=...&reference=...`
pub(super) async fn payment_return(
    State(state): State<AppState>,
    live: LiveSession,
    signed: SignedReturn,
) -> Result<Json<VerificationOutcome>, ApiError> {
    let outcome = state
        .orchestrator
        .handle_return(&live.handle, &signed.reference)
        .await?;
    Ok(Json(outcome))
}
