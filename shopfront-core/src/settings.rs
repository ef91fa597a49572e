//! Delivery settings snapshot used for one checkout session.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_sdk::objects::DeliverySettingsPayload;

use crate::pricing::currency::non_negative;

/// Delivery fee and minimum-order settings.
///
/// Fetched once when a checkout loads and never refreshed mid-session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySettings {
    /// Flat fee of the legacy cart-page formula.
    pub base_fee: Decimal,
    /// Per-kilogram fee of the legacy cart-page formula.
    pub fee_per_kg: Decimal,
    /// Fee for carts up to 50kg.
    pub fee_tier1: Decimal,
    /// Fee for carts above 50kg up to 100kg.
    pub fee_tier2: Decimal,
    /// Fee for carts above 100kg.
    pub fee_tier3: Decimal,
    pub minimum_order_quantity: u32,
    /// Zero disables the amount gate.
    pub minimum_order_amount: Decimal,
    pub delivery_info_points: Vec<String>,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            base_fee: Decimal::from(500),
            fee_per_kg: Decimal::from(100),
            fee_tier1: Decimal::from(2000),
            fee_tier2: Decimal::from(3500),
            fee_tier3: Decimal::from(5000),
            minimum_order_quantity: 1,
            minimum_order_amount: Decimal::ZERO,
            delivery_info_points: Vec::new(),
        }
    }
}

impl DeliverySettings {
    /// Merge a fetched settings document over `defaults`.
    ///
    /// Absent or unreadable fields take the default; negative amounts are
    /// clamped to zero and the minimum quantity is at least one.
    pub fn from_payload(payload: DeliverySettingsPayload, defaults: &DeliverySettings) -> Self {
        let amount = |value: Option<Decimal>, default: Decimal| {
            non_negative(value.unwrap_or(default))
        };

        Self {
            base_fee: amount(payload.base_fee, defaults.base_fee),
            fee_per_kg: amount(payload.fee_per_kg, defaults.fee_per_kg),
            fee_tier1: amount(payload.fee_tier1, defaults.fee_tier1),
            fee_tier2: amount(payload.fee_tier2, defaults.fee_tier2),
            fee_tier3: amount(payload.fee_tier3, defaults.fee_tier3),
            minimum_order_quantity: payload
                .minimum_order_quantity
                .unwrap_or(defaults.minimum_order_quantity)
                .max(1),
            minimum_order_amount: amount(
                payload.minimum_order_amount,
                defaults.minimum_order_amount,
            ),
            delivery_info_points: payload
                .delivery_info_points
                .unwrap_or_else(|| defaults.delivery_info_points.clone()),
        }
    }
}
