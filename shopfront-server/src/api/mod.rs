//! HTTP API.
//!
//! # Endpoints
//!
//! - `/api/v1/checkout/...` – checkout sessions, see [`checkout`]
//! - `POST /api/v1/quote`   – cart-page delivery quote

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use shopfront_core::errors::{CheckoutError, ValidationIssue};

use crate::state::AppState;

pub mod checkout;
pub mod extractors;
mod quote;

/// Build the `/api/v1` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/checkout", checkout::router())
        .route("/quote", post(quote::quote))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    Checkout(CheckoutError),
    /// No live checkout with that id.
    NotFound,
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<ValidationIssue> for ApiError {
    fn from(err: ValidationIssue) -> Self {
        ApiError::Checkout(err.into())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<&'static str>,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, Option<&'static str>) {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not_found", None),
            ApiError::Checkout(err) => match err {
                CheckoutError::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "unauthenticated", Some("/login"))
                }
                CheckoutError::EmptyCart => {
                    (StatusCode::CONFLICT, "empty_cart", Some("/marketplace"))
                }
                CheckoutError::Validation(ValidationIssue::WrongStep { .. }) => {
                    (StatusCode::CONFLICT, "wrong_step", None)
                }
                CheckoutError::Validation(_) => (StatusCode::BAD_REQUEST, "validation", None),
                CheckoutError::MoqNotMet(_) => (StatusCode::CONFLICT, "moq_not_met", None),
                CheckoutError::InsufficientFunds { .. } => {
                    (StatusCode::PAYMENT_REQUIRED, "insufficient_funds", None)
                }
                CheckoutError::PaymentInitFailed(_) => {
                    (StatusCode::BAD_GATEWAY, "payment_init_failed", None)
                }
                CheckoutError::PaymentVerificationFailed { .. } => {
                    (StatusCode::BAD_GATEWAY, "payment_verification_failed", None)
                }
                CheckoutError::OrderCreationFailed(_) => {
                    (StatusCode::BAD_GATEWAY, "order_creation_failed", None)
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, redirect) = self.parts();
        let message = match &self {
            ApiError::NotFound => "checkout not found".to_string(),
            ApiError::Checkout(err) => err.to_string(),
        };
        if status.is_server_error() {
            tracing::warn!(%status, error, %message, "Checkout request failed upstream");
        }
        (
            status,
            Json(ErrorBody {
                error,
                message,
                redirect,
            }),
        )
            .into_response()
    }
}
