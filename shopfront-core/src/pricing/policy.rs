//! Delivery fee strategies.
//!
//! The checkout and every order total use [`WeightTierPolicy`]. The other
//! policies only drive what the cart page displays.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_sdk::objects::{CartItem, CustomerRole};

use super::{non_negative, per_item_delivery_fee, round_currency, tier_fee, total_weight};
use crate::settings::DeliverySettings;

pub trait DeliveryFeePolicy: Send + Sync {
    fn delivery_fee(&self, items: &[CartItem], settings: &DeliverySettings) -> Decimal;
}

/// Fee picked from the weight tier table.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightTierPolicy;

impl DeliveryFeePolicy for WeightTierPolicy {
    fn delivery_fee(&self, items: &[CartItem], settings: &DeliverySettings) -> Decimal {
        if items.is_empty() {
            return Decimal::ZERO;
        }
        tier_fee(total_weight(items), settings)
    }
}

/// Base fee plus per-item weight fee, as the cart page used to show it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerItemWeightPolicy;

impl DeliveryFeePolicy for PerItemWeightPolicy {
    fn delivery_fee(&self, items: &[CartItem], settings: &DeliverySettings) -> Decimal {
        per_item_delivery_fee(items, settings)
    }
}

/// A fee typed in by an admin on the cart page.
#[derive(Debug, Clone, Copy)]
pub struct AdminOverridePolicy(pub Decimal);

impl DeliveryFeePolicy for AdminOverridePolicy {
    fn delivery_fee(&self, items: &[CartItem], _settings: &DeliverySettings) -> Decimal {
        if items.is_empty() {
            return Decimal::ZERO;
        }
        round_currency(non_negative(self.0))
    }
}

/// Where a fee is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PricingSurface {
    Cart,
    #[default]
    Checkout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingPolicy {
    WeightTier,
    PerItemWeight,
    AdminOverride(Decimal),
}

impl PricingPolicy {
    /// Pick the policy for a caller on a surface.
    ///
    /// Only admins may override, and only on the cart page.
    pub fn for_surface(
        role: CustomerRole,
        surface: PricingSurface,
        admin_override: Option<Decimal>,
    ) -> Self {
        match (surface, role, admin_override) {
            (PricingSurface::Checkout, _, _) => PricingPolicy::WeightTier,
            (PricingSurface::Cart, CustomerRole::Admin, Some(fee)) => {
                PricingPolicy::AdminOverride(fee)
            }
            (PricingSurface::Cart, _, _) => PricingPolicy::PerItemWeight,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PricingPolicy::WeightTier => "weight_tier",
            PricingPolicy::PerItemWeight => "per_item_weight",
            PricingPolicy::AdminOverride(_) => "admin_override",
        }
    }
}

impl DeliveryFeePolicy for PricingPolicy {
    fn delivery_fee(&self, items: &[CartItem], settings: &DeliverySettings) -> Decimal {
        match self {
            PricingPolicy::WeightTier => WeightTierPolicy.delivery_fee(items, settings),
            PricingPolicy::PerItemWeight => PerItemWeightPolicy.delivery_fee(items, settings),
            PricingPolicy::AdminOverride(fee) => {
                AdminOverridePolicy(*fee).delivery_fee(items, settings)
            }
        }
    }
}
