//! Delivery settings and delivery slots as served by the storefront API.

use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use super::lenient;

/// Delivery settings document, exactly as the admin saved it.
///
/// Every field is optional; the checkout core fills the gaps from its
/// configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySettingsPayload {
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub base_fee: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub fee_per_kg: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub fee_tier1: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub fee_tier2: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub fee_tier3: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub minimum_order_quantity: Option<u32>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub minimum_order_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub delivery_info_points: Option<Vec<String>>,
}

/// A bookable delivery window.
///
/// At capacity when `current_orders >= max_orders`. Capacity is advisory:
/// fulfillment moves such orders to the next day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySlot {
    pub id: String,
    #[serde(deserialize_with = "lenient::date")]
    pub date: Date,
    pub time_slot: CompactString,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub max_orders: u32,
    #[serde(default)]
    pub current_orders: u32,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DeliverySlot {
    pub fn is_at_capacity(&self) -> bool {
        self.current_orders >= self.max_orders
    }
}
