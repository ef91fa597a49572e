use std::sync::Arc;
use std::sync::atomic::Ordering;

use rust_decimal::Decimal;
use shopfront_sdk::objects::CustomerRole;
use tracing::{debug, info, warn};

use super::session::{CheckoutSession, SessionHandle};
use crate::cart::CartStore;
use crate::config::{CheckoutConfig, ConfigStore};
use crate::errors::{CheckoutError, ValidationIssue};
use crate::gateway::{DeliveryDirectory, WalletLedger};
use crate::pricing;
use crate::settings::DeliverySettings;
use crate::slots::DeliverySlotSelector;

/// Request to open a checkout.
pub struct StartCheckout {
    pub customer_id: Option<String>,
    pub role: CustomerRole,
    pub cart: Arc<dyn CartStore>,
}

/// Opens checkout sessions and fetches the data they display.
#[derive(Clone)]
pub struct CheckoutLoader {
    directory: Arc<dyn DeliveryDirectory>,
    wallet: Arc<dyn WalletLedger>,
    config: ConfigStore<CheckoutConfig>,
}

impl CheckoutLoader {
    pub fn new(
        directory: Arc<dyn DeliveryDirectory>,
        wallet: Arc<dyn WalletLedger>,
        config: ConfigStore<CheckoutConfig>,
    ) -> Self {
        Self {
            directory,
            wallet,
            config,
        }
    }

    /// Create a session without fetching anything yet.
    pub fn start(&self, request: StartCheckout) -> Result<SessionHandle, CheckoutError> {
        let customer_id = request
            .customer_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(CheckoutError::Unauthenticated)?;
        let items = request.cart.items();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if !pricing::cart_in_range(&items) {
            warn!(%customer_id, lines = items.len(), "Cart totals out of range, refusing checkout");
            return Err(ValidationIssue::CartOutOfRange.into());
        }

        let config = self.config.snapshot();
        let session = CheckoutSession::new(
            customer_id,
            request.role,
            request.cart,
            config.fallback_settings.clone(),
            config.reference_memory,
        );
        info!(checkout_id = %session.id(), "Checkout started");
        Ok(session.into_handle())
    }

    /// Create a session and load it.
    pub async fn open(&self, request: StartCheckout) -> Result<SessionHandle, CheckoutError> {
        let handle = self.start(request)?;
        self.load(&handle).await;
        Ok(handle)
    }

    /// Fetch settings, slots and wallet balance concurrently.
    ///
    /// Failures fall back to configured settings, no slots and a zero
    /// balance. Results are dropped if the session was cancelled meanwhile.
    pub async fn load(&self, handle: &SessionHandle) {
        let (checkout_id, customer_id, cancelled) = {
            let session = handle.lock().await;
            (
                session.id(),
                session.customer_id().to_owned(),
                session.cancellation_flag(),
            )
        };
        let config = self.config.snapshot();

        let (settings, slots, balance) = tokio::join!(
            self.directory.delivery_settings(),
            self.directory.delivery_slots(),
            self.wallet.balance(&customer_id),
        );

        let settings = match settings {
            Ok(payload) => DeliverySettings::from_payload(payload, &config.fallback_settings),
            Err(e) => {
                warn!(
                    %checkout_id,
                    error = %e,
                    "Failed to fetch delivery settings, using defaults"
                );
                config.fallback_settings.clone()
            }
        };
        let slots = slots.unwrap_or_else(|e| {
            warn!(%checkout_id, error = %e, "Failed to fetch delivery slots");
            Vec::new()
        });
        let balance = balance.unwrap_or_else(|e| {
            warn!(%checkout_id, error = %e, "Failed to fetch wallet balance");
            Decimal::ZERO
        });

        if cancelled.load(Ordering::Acquire) {
            debug!(%checkout_id, "Checkout cancelled during load, discarding results");
            return;
        }

        let slots = DeliverySlotSelector::new(slots);
        debug!(
            %checkout_id,
            slot_count = slots.len(),
            wallet_balance = %balance,
            "Checkout data loaded"
        );
        handle.lock().await.apply_loaded(settings, slots, balance);
    }
}
