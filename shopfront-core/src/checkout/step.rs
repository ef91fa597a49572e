use serde::Serialize;

/// Where the shopper is in the checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckoutStep {
    #[default]
    DeliveryInfo,
    Payment,
    Confirmation,
}

impl CheckoutStep {
    /// 1-based position shown in the step indicator.
    pub fn number(self) -> u8 {
        match self {
            CheckoutStep::DeliveryInfo => 1,
            CheckoutStep::Payment => 2,
            CheckoutStep::Confirmation => 3,
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutStep::DeliveryInfo => write!(f, "delivery info"),
            CheckoutStep::Payment => write!(f, "payment"),
            CheckoutStep::Confirmation => write!(f, "confirmation"),
        }
    }
}
