//! Checkout session API.
//!
//! Called by the storefront frontend (the shopper's browser).
//!
//! # Endpoints
//!
//! - `POST   /`                        – start a checkout
//! - `GET    /{id}`                    – session view
//! - `DELETE /{id}`                    – leave the checkout
//! - `PUT    /{id}/address`            – select delivery address
//! - `PUT    /{id}/date`               – select delivery date
//! - `PUT    /{id}/time`               – select delivery time
//! - `PUT    /{id}/notes`              – delivery notes
//! - `PUT    /{id}/payment-method`     – payment method and wallet use
//! - `GET    /{id}/slots?date=`        – slots on a date
//! - `POST   /{id}/proceed`            – delivery info → payment
//! - `POST   /{id}/back`               – payment → delivery info
//! - `POST   /{id}/orders`             – place the order
//! - `POST   /{id}/payment/callback`   – hosted payment succeeded
//! - `POST   /{id}/payment/closed`     – payment overlay closed
//! - `GET|POST /{id}/return`           – signed return redirect
//! - `GET    /{id}/notices`            – take queued notices

use axum::{
    Router,
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::Serialize;
use shopfront_core::checkout::{CheckoutSession, CheckoutStep};
use shopfront_core::events::{CheckoutNotice, NoticeSeverity};
use shopfront_core::pricing::CheckoutTotals;
use shopfront_core::slots::{SlotSelection, SlotSetupPrompt};
use shopfront_sdk::objects::{DeliveryAddress, DeliverySlot, PaymentMethod};
use time::Date;
use uuid::Uuid;

use crate::state::AppState;

mod payment;
mod session;

/// Build the checkout router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(session::start_checkout))
        .route(
            "/{id}",
            get(session::get_checkout).delete(session::leave_checkout),
        )
        .route("/{id}/address", put(session::set_address))
        .route("/{id}/date", put(session::select_date))
        .route("/{id}/time", put(session::select_time))
        .route("/{id}/notes", put(session::set_notes))
        .route("/{id}/payment-method", put(session::set_payment_method))
        .route("/{id}/slots", get(session::list_slots))
        .route("/{id}/proceed", post(session::proceed))
        .route("/{id}/back", post(session::back))
        .route("/{id}/notices", get(session::take_notices))
        .route("/{id}/orders", post(payment::place_order))
        .route("/{id}/payment/callback", post(payment::payment_callback))
        .route("/{id}/payment/closed", post(payment::overlay_closed))
        .route(
            "/{id}/return",
            get(payment::payment_return).post(payment::payment_return),
        )
}

/// Everything the checkout page renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    id: Uuid,
    step: CheckoutStep,
    step_number: u8,
    loaded: bool,
    totals: CheckoutTotals,
    moq_messages: Vec<String>,
    delivery_info_points: Vec<String>,
    dates: Vec<Date>,
    selection: SlotSelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    slot_setup: Option<SlotSetupPrompt>,
    address: Option<DeliveryAddress>,
    notes: String,
    payment_method: Option<PaymentMethod>,
    use_wallet: bool,
    wallet_balance: Decimal,
    order_id: Option<String>,
    pending_reference: Option<String>,
    placing_order: bool,
    pending_notices: usize,
}

impl CheckoutView {
    fn new(session: &CheckoutSession, pending_notices: usize) -> Self {
        let totals = session.totals();
        Self {
            id: session.id(),
            step: session.step(),
            step_number: session.step().number(),
            loaded: session.is_loaded(),
            moq_messages: totals.moq.messages(),
            totals,
            delivery_info_points: session.settings().delivery_info_points.clone(),
            dates: session.slots().dates(),
            selection: session.selection().clone(),
            slot_setup: session.slot_setup_prompt(),
            address: session.address().cloned(),
            notes: session.notes().to_owned(),
            payment_method: session.payment_method(),
            use_wallet: session.use_wallet(),
            wallet_balance: session.wallet_balance(),
            order_id: session.order_id().map(str::to_owned),
            pending_reference: session.pending_reference().map(str::to_owned),
            placing_order: session.is_in_flight(),
            pending_notices,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    id: String,
    time_slot: String,
    at_capacity: bool,
    price: Option<Decimal>,
    description: Option<String>,
}

impl From<&DeliverySlot> for SlotView {
    fn from(slot: &DeliverySlot) -> Self {
        Self {
            id: slot.id.clone(),
            time_slot: slot.time_slot.to_string(),
            at_capacity: slot.is_at_capacity(),
            price: slot.price,
            description: slot.description.clone(),
        }
    }
}

/// A notice as the browser shows it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeView {
    severity: NoticeSeverity,
    message: String,
    #[serde(flatten)]
    notice: CheckoutNotice,
}

impl From<CheckoutNotice> for NoticeView {
    fn from(notice: CheckoutNotice) -> Self {
        Self {
            severity: notice.kind.severity(),
            message: notice.kind.message(),
            notice,
        }
    }
}
