use shopfront_sdk::objects::{CartItem, OrderDraft, OrderLineItem};

use crate::checkout::PlacementSnapshot;
use crate::pricing::{line_total, non_negative, round_currency};

fn line_item(item: &CartItem) -> OrderLineItem {
    let unit_price = round_currency(non_negative(item.price));
    OrderLineItem {
        product_id: item.product_id.clone(),
        variation_id: item.variation_id.clone(),
        name: item.name.clone(),
        quantity: item.quantity,
        unit_price,
        total_price: round_currency(line_total(unit_price, item.quantity)),
        unit: item.unit.clone(),
    }
}

/// Build the one order payload both payment protocols send.
///
/// Totals always come from the weight-tier fee. `defer_creation` is set on
/// the hosted path so the order only exists once payment verifies.
pub(crate) fn build_draft(
    snapshot: &PlacementSnapshot,
    use_wallet: bool,
    defer_creation: bool,
) -> OrderDraft {
    let totals = snapshot.totals(use_wallet);

    OrderDraft {
        customer_id: snapshot.customer_id.clone(),
        items: snapshot.items.iter().map(line_item).collect(),
        delivery_address: snapshot.address.clone(),
        delivery_date: snapshot.slot.date,
        delivery_time: snapshot.slot.time_slot.clone(),
        delivery_slot_id: snapshot.slot.slot_id.clone(),
        delivery_notes: snapshot.notes.clone(),
        payment_method: snapshot.payment_method,
        use_wallet,
        wallet_deduction: totals.wallet_deduction,
        subtotal: totals.subtotal,
        delivery_fee: totals.delivery_fee,
        total: totals.gross_total,
        amount_due: totals.final_total,
        slot_at_capacity: snapshot.slot.at_capacity,
        defer_creation,
    }
}
