use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::pricing::format_naira;

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeSeverity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NoticeKind {
    #[serde(rename_all = "camelCase")]
    OrderPlaced {
        order_id: Option<String>,
        /// The slot was full, so the order ships a day later.
        next_day_delivery: bool,
    },
    /// The payment has not settled yet, e.g. a bank transfer.
    PaymentPending { reference: String },
    /// The overlay closed and the payment did not verify.
    PaymentLikelyCancelled { reference: String },
    PaymentFailed { reference: String, reason: String },
    PaymentInitFailed { reason: String },
    OrderFailed { reason: String },
    InsufficientFunds {
        available: Decimal,
        required: Decimal,
    },
}

impl NoticeKind {
    pub fn severity(&self) -> NoticeSeverity {
        match self {
            NoticeKind::OrderPlaced { .. } => NoticeSeverity::Success,
            NoticeKind::PaymentPending { .. } => NoticeSeverity::Info,
            NoticeKind::PaymentLikelyCancelled { .. } => NoticeSeverity::Warning,
            NoticeKind::PaymentFailed { .. }
            | NoticeKind::PaymentInitFailed { .. }
            | NoticeKind::OrderFailed { .. }
            | NoticeKind::InsufficientFunds { .. } => NoticeSeverity::Error,
        }
    }

    /// Text shown to the shopper.
    pub fn message(&self) -> String {
        match self {
            NoticeKind::OrderPlaced {
                next_day_delivery: false,
                ..
            } => "Order placed successfully!".to_string(),
            NoticeKind::OrderPlaced {
                next_day_delivery: true,
                ..
            } => "Order placed! Your selected slot was full, so delivery moves to the next day."
                .to_string(),
            NoticeKind::PaymentPending { .. } => {
                "Payment is being processed. We'll confirm your order once it clears.".to_string()
            }
            NoticeKind::PaymentLikelyCancelled { .. } => {
                "Payment was not completed. You can try again.".to_string()
            }
            NoticeKind::PaymentFailed { reason, .. } => format!("Payment failed: {reason}"),
            NoticeKind::PaymentInitFailed { reason } => {
                format!("Could not start payment: {reason}")
            }
            NoticeKind::OrderFailed { reason } => format!("Could not place order: {reason}"),
            NoticeKind::InsufficientFunds {
                available,
                required,
            } => format!(
                "Insufficient wallet balance. You have {} but need {}.",
                format_naira(*available),
                format_naira(*required)
            ),
        }
    }
}

/// A notice for one checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutNotice {
    pub checkout_id: Uuid,
    #[serde(flatten)]
    pub kind: NoticeKind,
}

impl CheckoutNotice {
    pub fn new(checkout_id: Uuid, kind: NoticeKind) -> Self {
        Self { checkout_id, kind }
    }
}
