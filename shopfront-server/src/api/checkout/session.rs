use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use shopfront_core::cart::MemoryCart;
use shopfront_core::checkout::StartCheckout;
use shopfront_sdk::objects::{CartItem, CustomerRole, DeliveryAddress, PaymentMethod};
use time::Date;
use tracing::{debug, info};

use super::{CheckoutView, NoticeView, SlotView};
use crate::api::ApiError;
use crate::api::extractors::LiveSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StartCheckoutRequest {
    #[serde(default)]
    customer_id: Option<String>,
    #[serde(default)]
    role: CustomerRole,
    items: Vec<CartItem>,
}

async fn view(state: &AppState, live: &LiveSession) -> Json<CheckoutView> {
    let pending = state.sessions.pending_notices(live.id).await.unwrap_or(0);
    let session = live.handle.lock().await;
    Json(CheckoutView::new(&session, pending))
}

/// `POST /`: open a checkout for the posted cart.
///
/// The session is registered before its data loads so leaving during the
/// load cancels it.
pub(super) async fn start_checkout(
    State(state): State<AppState>,
    Json(body): Json<StartCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = state.loader.start(StartCheckout {
        customer_id: body.customer_id,
        role: body.role,
        cart: Arc::new(MemoryCart::new(body.items)),
    })?;
    let id = handle.lock().await.id();
    state.sessions.insert(id, handle.clone()).await;

    state.loader.load(&handle).await;

    let session = handle.lock().await;
    Ok((StatusCode::CREATED, Json(CheckoutView::new(&session, 0))))
}

/// `GET /{id}`
pub(super) async fn get_checkout(
    State(state): State<AppState>,
    live: LiveSession,
) -> Json<CheckoutView> {
    view(&state, &live).await
}

/// `DELETE /{id}`: the shopper navigated away.
pub(super) async fn leave_checkout(
    State(state): State<AppState>,
    live: LiveSession,
) -> StatusCode {
    live.handle.lock().await.cancel();
    state.sessions.remove(live.id).await;
    info!(checkout_id = %live.id, "Checkout left");
    StatusCode::NO_CONTENT
}

pub(super) async fn set_address(
    State(state): State<AppState>,
    live: LiveSession,
    Json(address): Json<DeliveryAddress>,
) -> Result<Json<CheckoutView>, ApiError> {
    live.handle.lock().await.set_address(address)?;
    Ok(view(&state, &live).await)
}

#[derive(Debug, Deserialize)]
pub(super) struct DateBody {
    date: Date,
}

pub(super) async fn select_date(
    State(state): State<AppState>,
    live: LiveSession,
    Json(body): Json<DateBody>,
) -> Result<Json<CheckoutView>, ApiError> {
    live.handle.lock().await.select_date(body.date)?;
    Ok(view(&state, &live).await)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TimeBody {
    time_slot: String,
}

pub(super) async fn select_time(
    State(state): State<AppState>,
    live: LiveSession,
    Json(body): Json<TimeBody>,
) -> Result<Json<CheckoutView>, ApiError> {
    live.handle.lock().await.select_time(&body.time_slot)?;
    Ok(view(&state, &live).await)
}

#[derive(Debug, Deserialize)]
pub(super) struct NotesBody {
    notes: String,
}

pub(super) async fn set_notes(
    State(state): State<AppState>,
    live: LiveSession,
    Json(body): Json<NotesBody>,
) -> Result<Json<CheckoutView>, ApiError> {
    live.handle.lock().await.set_notes(body.notes)?;
    Ok(view(&state, &live).await)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PaymentMethodBody {
    payment_method: PaymentMethod,
    #[serde(default)]
    use_wallet: bool,
}

pub(super) async fn set_payment_method(
    State(state): State<AppState>,
    live: LiveSession,
    Json(body): Json<PaymentMethodBody>,
) -> Result<Json<CheckoutView>, ApiError> {
    live.handle
        .lock()
        .await
        .set_payment_method(body.payment_method, body.use_wallet)?;
    Ok(view(&state, &live).await)
}

#[derive(Debug, Deserialize)]
pub(super) struct SlotsQuery {
    date: Date,
}

/// `GET /{id}/slots?date=YYYY-MM-DD`
pub(super) async fn list_slots(
    live: LiveSession,
    Query(query): Query<SlotsQuery>,
) -> Json<Vec<SlotView>> {
    let session = live.handle.lock().await;
    Json(session.slots().slots_for(query.date).map(SlotView::from).collect())
}

pub(super) async fn proceed(
    State(state): State<AppState>,
    live: LiveSession,
) -> Result<Json<CheckoutView>, ApiError> {
    live.handle.lock().await.proceed_to_payment()?;
    debug!(checkout_id = %live.id, "Proceeded to payment");
    Ok(view(&state, &live).await)
}

pub(super) async fn back(
    State(state): State<AppState>,
    live: LiveSession,
) -> Result<Json<CheckoutView>, ApiError> {
    live.handle.lock().await.back_to_delivery()?;
    Ok(view(&state, &live).await)
}

/// `GET /{id}/notices`: hand over queued notices, oldest first.
pub(super) async fn take_notices(
    State(state): State<AppState>,
    live: LiveSession,
) -> Json<Vec<NoticeView>> {
    let notices = state
        .sessions
        .drain_notices(live.id)
        .await
        .unwrap_or_default();
    Json(notices.into_iter().map(NoticeView::from).collect())
}
