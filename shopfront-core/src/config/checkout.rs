//! Checkout tuning knobs.

use std::time::Duration;

use crate::settings::DeliverySettings;

/// Delay before the single best-effort verification after the payment
/// overlay closes without a callback.
pub const DEFAULT_VERIFICATION_DELAY: Duration = Duration::from_secs(3);

/// How many verified payment references a session remembers.
pub const DEFAULT_REFERENCE_MEMORY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    pub verification_delay: Duration,
    pub reference_memory: usize,
    /// Used for any field the settings service leaves out, and for the
    /// whole document when it cannot be fetched.
    pub fallback_settings: DeliverySettings,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            verification_delay: DEFAULT_VERIFICATION_DELAY,
            reference_memory: DEFAULT_REFERENCE_MEMORY,
            fallback_settings: DeliverySettings::default(),
        }
    }
}
