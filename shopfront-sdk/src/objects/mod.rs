pub mod cart;
pub mod delivery;
pub mod lenient;
pub mod order;
pub mod payment;
pub mod wallet;

pub use cart::CartItem;
pub use delivery::{DeliverySettingsPayload, DeliverySlot};
pub use order::{DeliveryAddress, OrderCreated, OrderDraft, OrderLineItem, PaymentMethod};
pub use payment::{
    InitializePayment, PaymentInitialized, PaymentVerification, VerificationStatus,
};
pub use wallet::WalletBalance;

use serde::{Deserialize, Serialize};

/// Role of the person driving a checkout.
///
/// Only decides display concerns (fee override, slot setup prompt); order
/// totals never depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerRole {
    #[default]
    Customer,
    Admin,
}
