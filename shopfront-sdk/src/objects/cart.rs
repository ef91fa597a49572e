use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A line in the shopper's cart.
///
/// `delivery_fee` is a per-item override only read by the legacy cart-page
/// fee formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub variation_id: Option<String>,
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub unit: String,
    #[serde(default)]
    pub weight: Decimal,
    #[serde(default)]
    pub max_quantity: u32,
    #[serde(default)]
    pub delivery_fee: Option<Decimal>,
}
