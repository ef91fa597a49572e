//! Custom Axum extractors for checkout routes.
//!
//! Provides:
//! - `LiveSession`: resolves the `{id}` path segment to a live checkout.
//! - `SignedReturn`: verifies the `sig` query parameter of a payment return
//!   redirect against the checkout id in the path.
//!
//! Signature checks are delegated to [`shopfront_sdk::signature`].

use std::collections::HashMap;

use axum::{
    Json,
    extract::{FromRequestParts, Path, Query},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use shopfront_core::checkout::SessionHandle;
use shopfront_sdk::signature::{self, RETURN_SIGNATURE_PARAM, SignatureError};
use uuid::Uuid;

use super::ApiError;
use crate::state::AppState;

/// A checkout session looked up from the request path.
pub struct LiveSession {
    pub id: Uuid,
    pub handle: SessionHandle,
}

impl FromRequestParts<AppState> for LiveSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound)?;
        let handle = state.sessions.get(id).await.ok_or(ApiError::NotFound)?;
        Ok(LiveSession { id, handle })
    }
}

/// A verified payment return redirect.
///
/// ```text
/// /api/v1/checkout/{id}/return?sig={unix_timestamp}.{base64}&reference=...
/// ```
pub struct SignedReturn {
    pub reference: String,
}

/// Errors returned by the [`SignedReturn`] extractor.
#[derive(Debug, thiserror::Error)]
pub enum SignedReturnError {
    #[error("missing return signature")]
    MissingSignature,
    #[error("missing payment reference")]
    MissingReference,
    #[error("invalid checkout id")]
    InvalidCheckoutId,
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl IntoResponse for SignedReturnError {
    fn into_response(self) -> Response {
        let status = match &self {
            SignedReturnError::MissingSignature
            | SignedReturnError::Signature(SignatureError::SignatureMismatch)
            | SignedReturnError::Signature(SignatureError::Expired) => StatusCode::UNAUTHORIZED,
            SignedReturnError::MissingReference
            | SignedReturnError::InvalidCheckoutId
            | SignedReturnError::Signature(_) => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(json!({ "error": "invalid_return", "message": self.to_string() })),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for SignedReturn {
    type Rejection = SignedReturnError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| SignedReturnError::InvalidCheckoutId)?;
        let Query(mut params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| SignedReturnError::MissingReference)?;

        let sig = params
            .remove(RETURN_SIGNATURE_PARAM)
            .ok_or(SignedReturnError::MissingSignature)?;
        let reference = params
            .remove("reference")
            .filter(|r| !r.is_empty())
            .ok_or(SignedReturnError::MissingReference)?;

        let server_config = state.server_config.snapshot();
        signature::verify_checkout_return(
            &id.to_string(),
            &sig,
            server_config.return_secret_bytes(),
        )?;

        Ok(SignedReturn { reference })
    }
}
