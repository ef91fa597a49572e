//! Checkout pricing: delivery fees, minimum-order gating, wallet deduction.
//!
//! Everything here is pure and deterministic. Inputs are clamped rather
//! than rejected so totals shown to the shopper are never negative.

pub mod currency;
pub mod policy;

pub use currency::{format_naira, non_negative, round_currency};
pub use policy::{
    AdminOverridePolicy, DeliveryFeePolicy, PerItemWeightPolicy, PricingPolicy, PricingSurface,
    WeightTierPolicy,
};

use rust_decimal::Decimal;
use serde::Serialize;
use shopfront_sdk::objects::CartItem;

use crate::settings::DeliverySettings;

/// Upper bound (inclusive) of the first weight tier.
pub const TIER1_MAX_WEIGHT_KG: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
/// Upper bound (inclusive) of the second weight tier.
pub const TIER2_MAX_WEIGHT_KG: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

pub fn total_quantity(items: &[CartItem]) -> u32 {
    items
        .iter()
        .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
}

/// `amount × quantity`, saturating at `Decimal::MAX`.
pub fn line_total(amount: Decimal, quantity: u32) -> Decimal {
    non_negative(amount).saturating_mul(Decimal::from(quantity))
}

fn checked_line_sum(
    items: &[CartItem],
    amount: impl Fn(&CartItem) -> Decimal,
) -> Option<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        non_negative(amount(item))
            .checked_mul(Decimal::from(item.quantity))
            .and_then(|line| acc.checked_add(line))
    })
}

/// True when the cart's price and weight totals fit in a `Decimal`.
///
/// Checkout refuses carts that fail this.
pub fn cart_in_range(items: &[CartItem]) -> bool {
    checked_line_sum(items, |item| item.price).is_some()
        && checked_line_sum(items, |item| item.weight).is_some()
}

/// Sum of `price × quantity`, rounded to kobo.
pub fn subtotal(items: &[CartItem]) -> Decimal {
    round_currency(items.iter().fold(Decimal::ZERO, |acc, item| {
        acc.saturating_add(line_total(item.price, item.quantity))
    }))
}

/// Sum of `weight × quantity` in kilograms.
pub fn total_weight(items: &[CartItem]) -> Decimal {
    items.iter().fold(Decimal::ZERO, |acc, item| {
        acc.saturating_add(line_total(item.weight, item.quantity))
    })
}

/// Fee for a given cart weight under the tier table.
pub fn tier_fee(weight: Decimal, settings: &DeliverySettings) -> Decimal {
    let fee = match non_negative(weight) {
        w if w <= TIER1_MAX_WEIGHT_KG => settings.fee_tier1,
        w if w <= TIER2_MAX_WEIGHT_KG => settings.fee_tier2,
        _ => settings.fee_tier3,
    };
    round_currency(non_negative(fee))
}

/// Weight-tier delivery fee; the one used for order totals.
pub fn delivery_fee(items: &[CartItem], settings: &DeliverySettings) -> Decimal {
    WeightTierPolicy.delivery_fee(items, settings)
}

/// Legacy cart-page fee: base fee plus a per-item weight fee.
///
/// An item's own `delivery_fee` replaces `fee_per_kg × weight`; an override
/// of exactly zero means the item ships free.
pub fn per_item_delivery_fee(items: &[CartItem], settings: &DeliverySettings) -> Decimal {
    if items.is_empty() {
        return Decimal::ZERO;
    }

    let items_fee = items
        .iter()
        .filter(|item| item.delivery_fee != Some(Decimal::ZERO))
        .map(|item| {
            let per_unit = item.delivery_fee.unwrap_or_else(|| {
                non_negative(settings.fee_per_kg).saturating_mul(non_negative(item.weight))
            });
            line_total(per_unit, item.quantity)
        })
        .fold(Decimal::ZERO, Decimal::saturating_add);

    round_currency(non_negative(settings.base_fee).saturating_add(items_fee))
}

/// Outcome of the minimum-order check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoqGate {
    pub quantity_not_met: bool,
    pub amount_not_met: bool,
    pub minimum_order_quantity: u32,
    pub minimum_order_amount: Decimal,
    /// Items still needed to reach the minimum quantity.
    pub missing_quantity: u32,
    /// Amount still needed to reach the minimum amount.
    pub missing_amount: Decimal,
}

impl MoqGate {
    /// True when checkout must not advance to payment or place the order.
    pub fn is_blocking(&self) -> bool {
        self.quantity_not_met || self.amount_not_met
    }

    /// Messages explaining what is missing, one per unmet condition.
    pub fn messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if self.quantity_not_met {
            let noun = if self.missing_quantity == 1 { "item" } else { "items" };
            messages.push(format!(
                "Add {} more {noun} to reach the minimum order quantity of {}",
                self.missing_quantity, self.minimum_order_quantity
            ));
        }
        if self.amount_not_met {
            messages.push(format!(
                "Add {} more to reach the minimum order amount of {}",
                format_naira(self.missing_amount),
                format_naira(self.minimum_order_amount)
            ));
        }
        messages
    }
}

/// Check the cart against the minimum order quantity and amount.
///
/// The amount gate only applies when the configured minimum is positive.
pub fn moq_gate(items: &[CartItem], settings: &DeliverySettings) -> MoqGate {
    let quantity = total_quantity(items);
    let amount = subtotal(items);
    let minimum_amount = non_negative(settings.minimum_order_amount);

    let quantity_not_met = quantity < settings.minimum_order_quantity;
    let amount_not_met = minimum_amount > Decimal::ZERO && amount < minimum_amount;

    MoqGate {
        quantity_not_met,
        amount_not_met,
        minimum_order_quantity: settings.minimum_order_quantity,
        minimum_order_amount: minimum_amount,
        missing_quantity: settings.minimum_order_quantity.saturating_sub(quantity),
        missing_amount: if amount_not_met {
            round_currency(minimum_amount - amount)
        } else {
            Decimal::ZERO
        },
    }
}

/// Wallet money applied to the order, capped by both balance and total.
pub fn wallet_deduction(
    wallet_balance: Decimal,
    gross_total: Decimal,
    use_wallet: bool,
) -> Decimal {
    if !use_wallet {
        return Decimal::ZERO;
    }
    round_currency(non_negative(wallet_balance).min(non_negative(gross_total)))
}

/// Amount left to charge, never below zero.
pub fn final_total(subtotal: Decimal, delivery_fee: Decimal, wallet_deduction: Decimal) -> Decimal {
    non_negative(round_currency(
        non_negative(subtotal)
            .saturating_add(non_negative(delivery_fee))
            .saturating_sub(non_negative(wallet_deduction)),
    ))
}

/// Every figure the checkout shows for one cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub total_quantity: u32,
    pub total_weight: Decimal,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    /// Subtotal plus delivery fee.
    pub gross_total: Decimal,
    pub wallet_deduction: Decimal,
    /// What is left to charge after the wallet deduction.
    pub final_total: Decimal,
    pub moq: MoqGate,
}

impl CheckoutTotals {
    /// Compute totals with the weight-tier fee.
    pub fn compute(
        items: &[CartItem],
        settings: &DeliverySettings,
        wallet_balance: Decimal,
        use_wallet: bool,
    ) -> Self {
        Self::compute_with(&WeightTierPolicy, items, settings, wallet_balance, use_wallet)
    }

    /// Compute totals with an arbitrary fee policy, for display surfaces.
    pub fn compute_with(
        policy: &dyn DeliveryFeePolicy,
        items: &[CartItem],
        settings: &DeliverySettings,
        wallet_balance: Decimal,
        use_wallet: bool,
    ) -> Self {
        let subtotal = subtotal(items);
        let delivery_fee = policy.delivery_fee(items, settings);
        let gross_total = round_currency(subtotal.saturating_add(delivery_fee));
        let wallet_deduction = wallet_deduction(wallet_balance, gross_total, use_wallet);

        Self {
            total_quantity: total_quantity(items),
            total_weight: total_weight(items),
            subtotal,
            delivery_fee,
            gross_total,
            wallet_deduction,
            final_total: final_total(subtotal, delivery_fee, wallet_deduction),
            moq: moq_gate(items, settings),
        }
    }
}
