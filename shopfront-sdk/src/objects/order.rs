use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

/// How the shopper pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Debit the internal wallet when the order is created.
    Wallet,
    /// Hosted card / bank transfer / USSD checkout, verified afterwards.
    Paystack,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Wallet => write!(f, "wallet"),
            PaymentMethod::Paystack => write!(f, "paystack"),
        }
    }
}

/// Snapshot of the address an order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub landmark: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub product_id: String,
    pub variation_id: Option<String>,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub unit: String,
}

/// The single order payload shared by both payment protocols.
///
/// On the wallet path it is posted to the order service directly. On the
/// hosted path it rides along with payment initialization and
/// `defer_creation` tells the storefront to create the order only once the
/// payment verifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub customer_id: String,
    pub items: Vec<OrderLineItem>,
    pub delivery_address: DeliveryAddress,
    pub delivery_date: Date,
    pub delivery_time: CompactString,
    pub delivery_slot_id: String,
    pub delivery_notes: String,
    pub payment_method: PaymentMethod,
    pub use_wallet: bool,
    pub wallet_deduction: Decimal,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    /// Subtotal plus delivery fee.
    pub total: Decimal,
    /// What is left to charge after the wallet deduction.
    pub amount_due: Decimal,
    pub slot_at_capacity: bool,
    pub defer_creation: bool,
}

/// Response of the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: String,
    #[serde(default)]
    pub slot_at_capacity: bool,
}
