use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current wallet balance of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub balance: Decimal,
}
