//! Hosted-payment initialization and verification.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use super::order::{OrderDraft, PaymentMethod};

/// Request to open a hosted payment.
///
/// Exactly one of `order_data` (order not created yet) or `order_id`
/// (paying for an existing order) is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePayment {
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_data: Option<OrderDraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<Url>,
}

/// Handle returned by payment initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitialized {
    pub reference: String,
    pub authorization_url: Url,
    #[serde(default)]
    pub access_code: Option<String>,
}

/// Settlement state reported by the verification endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    #[serde(rename = "COMPLETED")]
    Completed,
    /// Typical for bank transfers that settle late.
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "FAILED", other)]
    Failed,
}

/// Result of verifying a payment reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    pub success: bool,
    pub status: VerificationStatus,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub slot_at_capacity: bool,
    /// Set when the reference was verified before and the order already
    /// exists.
    #[serde(default)]
    pub already_processed: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl PaymentVerification {
    pub fn is_completed(&self) -> bool {
        self.success && (self.status == VerificationStatus::Completed || self.already_processed)
    }

    pub fn is_pending(&self) -> bool {
        self.status == VerificationStatus::Pending
    }
}
