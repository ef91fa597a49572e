//! Cart store seam.
//!
//! The cart belongs to the storefront; checkout only reads it and clears
//! it once an order is confirmed.

use std::sync::{Mutex, PoisonError};

use rust_decimal::Decimal;
use shopfront_sdk::objects::CartItem;

use crate::pricing;

pub trait CartStore: Send + Sync {
    /// Snapshot of the current lines.
    fn items(&self) -> Vec<CartItem>;

    fn clear(&self);

    fn total_items(&self) -> u32 {
        pricing::total_quantity(&self.items())
    }

    fn total_price(&self) -> Decimal {
        pricing::subtotal(&self.items())
    }

    fn total_weight(&self) -> Decimal {
        pricing::total_weight(&self.items())
    }

    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// Cart held in process memory.
#[derive(Debug, Default)]
pub struct MemoryCart {
    items: Mutex<Vec<CartItem>>,
}

impl MemoryCart {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }
}

impl CartStore for MemoryCart {
    fn items(&self) -> Vec<CartItem> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
