//! In-memory collaborators and fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use shopfront_sdk::objects::{
    CartItem, CustomerRole, DeliveryAddress, DeliverySettingsPayload, DeliverySlot,
    InitializePayment, OrderCreated, OrderDraft, PaymentInitialized, PaymentMethod,
    PaymentVerification, VerificationStatus,
};
use time::Date;
use time::macros::date;

use crate::cart::MemoryCart;
use crate::checkout::{CheckoutSession, SessionHandle};
use crate::errors::GatewayError;
use crate::gateway::{DeliveryDirectory, OrderService, PaymentProvider, WalletLedger};
use crate::settings::DeliverySettings;
use crate::slots::DeliverySlotSelector;

pub fn cart_item(id: &str, price: &str, quantity: u32, weight: Decimal) -> CartItem {
    CartItem {
        id: format!("ci_{id}"),
        product_id: id.to_string(),
        variation_id: None,
        name: id.to_string(),
        quantity,
        price: price.parse().unwrap(),
        unit: "bag".to_string(),
        weight,
        max_quantity: 100,
        delivery_fee: None,
    }
}

pub fn slot(id: &str, date: Date, time_slot: &str, current: u32, max: u32) -> DeliverySlot {
    DeliverySlot {
        id: id.to_string(),
        date,
        time_slot: time_slot.into(),
        is_available: true,
        max_orders: max,
        current_orders: current,
        price: None,
        description: None,
    }
}

pub fn address() -> DeliveryAddress {
    DeliveryAddress {
        id: "addr_1".to_string(),
        full_name: "Ada Obi".to_string(),
        phone: "+2348000000000".to_string(),
        street: "12 Marina Road".to_string(),
        city: "Lagos".to_string(),
        state: "Lagos".to_string(),
        landmark: None,
    }
}

pub fn loaded_session(
    items: Vec<CartItem>,
    settings: DeliverySettings,
    slots: Vec<DeliverySlot>,
) -> CheckoutSession {
    let mut session = CheckoutSession::new(
        "cus_1".to_string(),
        CustomerRole::Customer,
        Arc::new(MemoryCart::new(items)),
        DeliverySettings::default(),
        8,
    );
    session.apply_loaded(settings, DeliverySlotSelector::new(slots), Decimal::ZERO);
    session
}

/// A session on the payment step with slot `09:00-12:00` on 2025-01-15
/// holding `current_orders` of 10 orders.
pub fn payment_session(
    items: Vec<CartItem>,
    settings: DeliverySettings,
    wallet_balance: i64,
    method: PaymentMethod,
    current_orders: u32,
) -> SessionHandle {
    let mut session = CheckoutSession::new(
        "cus_1".to_string(),
        CustomerRole::Customer,
        Arc::new(MemoryCart::new(items)),
        DeliverySettings::default(),
        8,
    );
    session.apply_loaded(
        settings,
        DeliverySlotSelector::new(vec![slot(
            "slot_1",
            date!(2025 - 01 - 15),
            "09:00-12:00",
            current_orders,
            10,
        )]),
        Decimal::from(wallet_balance),
    );
    session.set_address(address()).unwrap();
    session.select_date(date!(2025 - 01 - 15)).unwrap();
    session.select_time("09:00-12:00").unwrap();
    session.proceed_to_payment().unwrap();
    session.set_payment_method(method, false).unwrap();
    session.into_handle()
}

pub fn verification(status: VerificationStatus, order_id: Option<&str>) -> PaymentVerification {
    PaymentVerification {
        success: status == VerificationStatus::Completed,
        status,
        order_id: order_id.map(str::to_string),
        slot_at_capacity: false,
        already_processed: false,
        message: None,
    }
}

pub struct FakeDirectory {
    pub settings: Result<DeliverySettingsPayload, GatewayError>,
    pub slots: Result<Vec<DeliverySlot>, GatewayError>,
}

impl Default for FakeDirectory {
    fn default() -> Self {
        Self {
            settings: Ok(DeliverySettingsPayload::default()),
            slots: Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl DeliveryDirectory for FakeDirectory {
    async fn delivery_settings(&self) -> Result<DeliverySettingsPayload, GatewayError> {
        self.settings.clone()
    }

    async fn delivery_slots(&self) -> Result<Vec<DeliverySlot>, GatewayError> {
        self.slots.clone()
    }
}

pub struct FakeWallet {
    pub balance: Result<Decimal, GatewayError>,
}

impl FakeWallet {
    pub fn with_balance(balance: i64) -> Self {
        Self {
            balance: Ok(Decimal::from(balance)),
        }
    }
}

#[async_trait]
impl WalletLedger for FakeWallet {
    async fn balance(&self, _customer_id: &str) -> Result<Decimal, GatewayError> {
        self.balance.clone()
    }
}

pub struct FakeOrders {
    result: Result<OrderCreated, GatewayError>,
    drafts: Mutex<Vec<OrderDraft>>,
}

impl FakeOrders {
    pub fn succeeding(order_id: &str) -> Self {
        Self {
            result: Ok(OrderCreated {
                order_id: order_id.to_string(),
                slot_at_capacity: false,
            }),
            drafts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(GatewayError::Rejected {
                status: 500,
                message: "database unavailable".to_string(),
            }),
            drafts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.drafts.lock().unwrap().len()
    }

    pub fn last_draft(&self) -> Option<OrderDraft> {
        self.drafts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl OrderService for FakeOrders {
    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderCreated, GatewayError> {
        self.drafts.lock().unwrap().push(draft.clone());
        self.result.clone()
    }
}

pub struct FakePayments {
    init: Result<PaymentInitialized, GatewayError>,
    verification: Result<PaymentVerification, GatewayError>,
    /// Answers handed out before falling back to `verification`.
    queued: Mutex<VecDeque<PaymentVerification>>,
    requests: Mutex<Vec<InitializePayment>>,
    verify_calls: AtomicUsize,
}

impl Default for FakePayments {
    fn default() -> Self {
        Self {
            init: Ok(PaymentInitialized {
                reference: "ref_1".to_string(),
                authorization_url: "https://checkout.paystack.com/ref_1".parse().unwrap(),
                access_code: Some("ac_1".to_string()),
            }),
            verification: Ok(verification(VerificationStatus::Completed, Some("ord_1"))),
            queued: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            verify_calls: AtomicUsize::new(0),
        }
    }
}

impl FakePayments {
    pub fn verifying(verification: PaymentVerification) -> Self {
        Self {
            verification: Ok(verification),
            ..Self::default()
        }
    }

    /// Answer `first` once, then `then` for every later verification.
    pub fn verifying_in_turn(first: PaymentVerification, then: PaymentVerification) -> Self {
        Self {
            queued: Mutex::new(VecDeque::from([first])),
            ..Self::verifying(then)
        }
    }

    pub fn failing_init() -> Self {
        Self {
            init: Err(GatewayError::Unavailable("connection refused".to_string())),
            ..Self::default()
        }
    }

    pub fn initialize_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_initialize(&self) -> Option<InitializePayment> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProvider for FakePayments {
    async fn initialize(
        &self,
        request: &InitializePayment,
    ) -> Result<PaymentInitialized, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.init.clone()
    }

    async fn verify(&self, _reference: &str) -> Result<PaymentVerification, GatewayError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        match self.queued.lock().unwrap().pop_front() {
            Some(verification) => Ok(verification),
            None => self.verification.clone(),
        }
    }
}
