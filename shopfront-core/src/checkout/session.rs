use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use shopfront_sdk::objects::{CartItem, CustomerRole, DeliveryAddress, PaymentMethod};
use time::Date;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::references::ReferenceSet;
use super::step::CheckoutStep;
use crate::cart::CartStore;
use crate::errors::{CheckoutError, ValidationIssue};
use crate::orchestrator::PaymentHandoff;
use crate::pricing::{CheckoutTotals, non_negative};
use crate::settings::DeliverySettings;
use crate::slots::{
    ChosenSlot, DeliverySlotSelector, SlotSelection, SlotSetupPrompt, slot_setup_prompt,
};

/// Shared handle to a session. Never hold the lock across a collaborator
/// call.
pub type SessionHandle = Arc<Mutex<CheckoutSession>>;

/// One shopper's checkout, from delivery info to confirmation.
pub struct CheckoutSession {
    id: Uuid,
    customer_id: String,
    role: CustomerRole,
    cart: Arc<dyn CartStore>,
    settings: DeliverySettings,
    slots: DeliverySlotSelector,
    wallet_balance: Decimal,
    loaded: bool,
    address: Option<DeliveryAddress>,
    selection: SlotSelection,
    notes: String,
    payment_method: Option<PaymentMethod>,
    use_wallet: bool,
    step: CheckoutStep,
    order_id: Option<String>,
    in_flight: bool,
    handoff: Option<PaymentHandoff>,
    /// References returned by this session's payment initializations.
    issued: ReferenceSet,
    /// References already taken for verification.
    verified: ReferenceSet,
    cancelled: Arc<AtomicBool>,
}

/// Everything order placement needs, copied out of the session so the
/// lock can be released before calling collaborators.
#[derive(Debug, Clone)]
pub struct PlacementSnapshot {
    pub checkout_id: Uuid,
    pub customer_id: String,
    pub items: Vec<CartItem>,
    pub settings: DeliverySettings,
    pub address: DeliveryAddress,
    pub slot: ChosenSlot,
    pub notes: String,
    pub payment_method: PaymentMethod,
    pub use_wallet: bool,
    pub wallet_balance: Decimal,
}

impl PlacementSnapshot {
    /// Totals for this snapshot, applying the wallet when `use_wallet`.
    pub fn totals(&self, use_wallet: bool) -> CheckoutTotals {
        CheckoutTotals::compute(&self.items, &self.settings, self.wallet_balance, use_wallet)
    }
}

impl CheckoutSession {
    pub fn new(
        customer_id: String,
        role: CustomerRole,
        cart: Arc<dyn CartStore>,
        settings: DeliverySettings,
        reference_memory: usize,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            customer_id,
            role,
            cart,
            settings,
            slots: DeliverySlotSelector::default(),
            wallet_balance: Decimal::ZERO,
            loaded: false,
            address: None,
            selection: SlotSelection::default(),
            notes: String::new(),
            payment_method: None,
            use_wallet: false,
            step: CheckoutStep::DeliveryInfo,
            order_id: None,
            in_flight: false,
            handoff: None,
            issued: ReferenceSet::new(reference_memory),
            verified: ReferenceSet::new(reference_memory),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn into_handle(self) -> SessionHandle {
        Arc::new(Mutex::new(self))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn role(&self) -> CustomerRole {
        self.role
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn settings(&self) -> &DeliverySettings {
        &self.settings
    }

    pub fn slots(&self) -> &DeliverySlotSelector {
        &self.slots
    }

    pub fn wallet_balance(&self) -> Decimal {
        self.wallet_balance
    }

    /// Whether settings, slots and balance have been fetched.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn address(&self) -> Option<&DeliveryAddress> {
        self.address.as_ref()
    }

    pub fn selection(&self) -> &SlotSelection {
        &self.selection
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn use_wallet(&self) -> bool {
        self.use_wallet
    }

    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn cart_items(&self) -> Vec<CartItem> {
        self.cart.items()
    }

    /// Reference of the hosted payment currently open, if any.
    pub fn pending_reference(&self) -> Option<&str> {
        self.handoff.as_ref().map(PaymentHandoff::reference)
    }

    pub fn slot_setup_prompt(&self) -> Option<SlotSetupPrompt> {
        slot_setup_prompt(&self.slots, self.role)
    }

    pub fn totals(&self) -> CheckoutTotals {
        CheckoutTotals::compute(
            &self.cart.items(),
            &self.settings,
            self.wallet_balance,
            self.use_wallet,
        )
    }

    /// Mark the session as abandoned. Late fetch results are discarded.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub(crate) fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub(crate) fn apply_loaded(
        &mut self,
        settings: DeliverySettings,
        slots: DeliverySlotSelector,
        wallet_balance: Decimal,
    ) {
        self.settings = settings;
        self.slots = slots;
        self.wallet_balance = non_negative(wallet_balance);
        self.selection = SlotSelection::default();
        self.loaded = true;
    }

    fn ensure_editable(&self) -> Result<(), ValidationIssue> {
        if self.step == CheckoutStep::Confirmation {
            return Err(ValidationIssue::WrongStep { current: self.step });
        }
        Ok(())
    }

    pub fn set_address(&mut self, address: DeliveryAddress) -> Result<(), ValidationIssue> {
        self.ensure_editable()?;
        self.address = Some(address);
        Ok(())
    }

    pub fn select_date(&mut self, date: Date) -> Result<(), ValidationIssue> {
        self.ensure_editable()?;
        self.selection.select_date(&self.slots, date)
    }

    pub fn select_time(&mut self, time_slot: &str) -> Result<(), ValidationIssue> {
        self.ensure_editable()?;
        self.selection.select_time(&self.slots, time_slot)
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<(), ValidationIssue> {
        self.ensure_editable()?;
        self.notes = notes.into();
        Ok(())
    }

    /// Choose how to pay. Paying with the wallet always applies it; a hosted
    /// payment may still apply part of the balance if `use_wallet` is set.
    pub fn set_payment_method(
        &mut self,
        method: PaymentMethod,
        use_wallet: bool,
    ) -> Result<(), ValidationIssue> {
        self.ensure_editable()?;
        self.payment_method = Some(method);
        self.use_wallet = method == PaymentMethod::Wallet || use_wallet;
        Ok(())
    }

    fn check_delivery_info(&self) -> Result<(&DeliveryAddress, ChosenSlot), CheckoutError> {
        let address = self.address.as_ref().ok_or(ValidationIssue::MissingAddress)?;
        let slot = self.selection.chosen()?;
        let gate = crate::pricing::moq_gate(&self.cart.items(), &self.settings);
        if gate.is_blocking() {
            return Err(CheckoutError::MoqNotMet(gate.messages().join(" ")));
        }
        Ok((address, slot))
    }

    /// Step 1 → 2.
    pub fn proceed_to_payment(&mut self) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::DeliveryInfo {
            return Err(ValidationIssue::WrongStep { current: self.step }.into());
        }
        self.check_delivery_info()?;
        self.step = CheckoutStep::Payment;
        Ok(())
    }

    /// Step 2 → 1. Selections are kept.
    pub fn back_to_delivery(&mut self) -> Result<(), ValidationIssue> {
        match self.step {
            CheckoutStep::Confirmation => Err(ValidationIssue::WrongStep { current: self.step }),
            _ => {
                self.step = CheckoutStep::DeliveryInfo;
                Ok(())
            }
        }
    }

    /// Validate the session for placement and copy out what the order needs.
    pub fn placement_snapshot(&self) -> Result<PlacementSnapshot, CheckoutError> {
        if self.step != CheckoutStep::Payment {
            return Err(ValidationIssue::WrongStep { current: self.step }.into());
        }
        let (address, slot) = self.check_delivery_info()?;
        let payment_method = self
            .payment_method
            .ok_or(ValidationIssue::MissingPaymentMethod)?;

        Ok(PlacementSnapshot {
            checkout_id: self.id,
            customer_id: self.customer_id.clone(),
            items: self.cart.items(),
            settings: self.settings.clone(),
            address: address.clone(),
            slot,
            notes: self.notes.clone(),
            payment_method,
            use_wallet: self.use_wallet,
            wallet_balance: self.wallet_balance,
        })
    }

    pub(crate) fn set_in_flight(&mut self, in_flight: bool) {
        self.in_flight = in_flight;
    }

    pub(crate) fn open_handoff(&mut self, handoff: PaymentHandoff) {
        self.issued.insert(handoff.reference());
        self.handoff = Some(handoff);
    }

    pub(crate) fn handoff(&self) -> Option<&PaymentHandoff> {
        self.handoff.as_ref()
    }

    /// Drop the open handoff if it is for `reference`, allowing a new
    /// placement.
    pub(crate) fn close_handoff(&mut self, reference: &str) {
        if self.pending_reference() == Some(reference) {
            self.handoff = None;
        }
    }

    /// Whether one of this session's payment initializations returned
    /// `reference`.
    pub fn issued_reference(&self, reference: &str) -> bool {
        self.issued.contains(reference)
    }

    pub(crate) fn claim_reference(&mut self, reference: &str) -> bool {
        self.verified.insert(reference)
    }

    pub(crate) fn release_reference(&mut self, reference: &str) {
        self.verified.remove(reference);
    }

    /// Record a confirmed order: clear the cart and move to step 3.
    ///
    /// Returns `false` if the session was already confirmed, in which case
    /// nothing changes.
    pub(crate) fn confirm(&mut self, order_id: Option<String>) -> bool {
        if self.step == CheckoutStep::Confirmation {
            return false;
        }
        self.order_id = order_id;
        self.cart.clear();
        self.step = CheckoutStep::Confirmation;
        self.handoff = None;
        true
    }
}
