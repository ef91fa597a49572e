//! Checkout failure taxonomy.
//!
//! Every variant is recoverable: the session stays alive and the shopper can
//! correct input and retry.

use rust_decimal::Decimal;
use thiserror::Error;
use time::Date;

use crate::checkout::CheckoutStep;

/// Input problems detected before any collaborator is called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("select a delivery address")]
    MissingAddress,
    #[error("select a delivery date")]
    MissingDate,
    #[error("select a delivery time")]
    MissingTime,
    #[error("select a payment method")]
    MissingPaymentMethod,
    #[error("no delivery slots are available on {0}")]
    UnknownDate(Date),
    #[error("no available delivery slot at {time_slot} on {date}")]
    UnknownTimeSlot { date: Date, time_slot: String },
    #[error("not available at the {current} step")]
    WrongStep { current: CheckoutStep },
    #[error("nothing left to charge, pay with your wallet instead")]
    NothingToCharge,
    #[error("cart prices or weights are too large")]
    CartOutOfRange,
}

/// Failure of an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The collaborator could not be reached or timed out.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    /// The collaborator answered with an error.
    #[error("collaborator rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// The collaborator answered with something we could not read.
    #[error("malformed collaborator response: {0}")]
    Malformed(String),
}

/// Errors surfaced by checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("sign in to check out")]
    Unauthenticated,

    #[error("your cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Validation(#[from] ValidationIssue),

    /// Minimum order quantity or amount not reached; carries the message
    /// shown to the shopper.
    #[error("{0}")]
    MoqNotMet(String),

    #[error("insufficient wallet balance: {available} available, {required} required")]
    InsufficientFunds { available: Decimal, required: Decimal },

    #[error("payment initialization failed: {0}")]
    PaymentInitFailed(GatewayError),

    /// `likely_cancelled` marks failures after the payment overlay was
    /// closed without a callback, which usually means the shopper gave up.
    #[error("payment {reference} could not be verified: {reason}")]
    PaymentVerificationFailed {
        reference: String,
        reason: String,
        likely_cancelled: bool,
    },

    #[error("order creation failed: {0}")]
    OrderCreationFailed(GatewayError),
}
