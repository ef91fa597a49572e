//! In-memory storefront and router helpers for handler tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use rust_decimal::Decimal;
use serde_json::Value;
use shopfront_core::config::{CheckoutConfig, ConfigStore};
use shopfront_core::errors::GatewayError;
use shopfront_core::events::{NoticeReceiver, notice_channel};
use shopfront_core::gateway::{DeliveryDirectory, OrderService, PaymentProvider, WalletLedger};
use shopfront_sdk::objects::{
    DeliverySettingsPayload, DeliverySlot, InitializePayment, OrderCreated, OrderDraft,
    PaymentInitialized, PaymentVerification, VerificationStatus,
};
use time::macros::date;
use tower::ServiceExt;

use crate::config::runtime::{ServerConfig, SessionLifetime};
use crate::server::build_router;
use crate::sessions::SessionRegistry;
use crate::state::{AppState, Collaborators};

pub const SLOT_DATE: &str = "2025-01-15";
pub const SLOT_TIME: &str = "09:00-12:00";

/// One fake standing in for every storefront endpoint.
pub struct FakeStorefront {
    pub settings: Mutex<Result<DeliverySettingsPayload, GatewayError>>,
    pub slots: Vec<DeliverySlot>,
    pub balance: Decimal,
    pub verification: Mutex<PaymentVerification>,
    pub drafts: Mutex<Vec<OrderDraft>>,
    pub initializations: Mutex<Vec<InitializePayment>>,
}

impl Default for FakeStorefront {
    fn default() -> Self {
        Self {
            settings: Mutex::new(Ok(DeliverySettingsPayload::default())),
            slots: vec![DeliverySlot {
                id: "slot_1".to_string(),
                date: date!(2025 - 01 - 15),
                time_slot: SLOT_TIME.into(),
                is_available: true,
                max_orders: 10,
                current_orders: 2,
                price: None,
                description: Some("Morning".to_string()),
            }],
            balance: Decimal::from(100_000),
            verification: Mutex::new(PaymentVerification {
                success: true,
                status: VerificationStatus::Completed,
                order_id: Some("ord_hosted".to_string()),
                slot_at_capacity: false,
                already_processed: false,
                message: None,
            }),
            drafts: Mutex::new(Vec::new()),
            initializations: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DeliveryDirectory for FakeStorefront {
    async fn delivery_settings(&self) -> Result<DeliverySettingsPayload, GatewayError> {
        self.settings.lock().unwrap().clone()
    }

    async fn delivery_slots(&self) -> Result<Vec<DeliverySlot>, GatewayError> {
        Ok(self.slots.clone())
    }
}

#[async_trait]
impl WalletLedger for FakeStorefront {
    async fn balance(&self, _customer_id: &str) -> Result<Decimal, GatewayError> {
        Ok(self.balance)
    }
}

#[async_trait]
impl OrderService for FakeStorefront {
    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderCreated, GatewayError> {
        self.drafts.lock().unwrap().push(draft.clone());
        Ok(OrderCreated {
            order_id: "ord_wallet".to_string(),
            slot_at_capacity: false,
        })
    }
}

#[async_trait]
impl PaymentProvider for FakeStorefront {
    async fn initialize(
        &self,
        request: &InitializePayment,
    ) -> Result<PaymentInitialized, GatewayError> {
        self.initializations.lock().unwrap().push(request.clone());
        Ok(PaymentInitialized {
            reference: "ref_1".to_string(),
            authorization_url: "https://pay.example.com/ref_1".parse().unwrap(),
            access_code: Some("code_1".to_string()),
        })
    }

    async fn verify(&self, _reference: &str) -> Result<PaymentVerification, GatewayError> {
        Ok(self.verification.lock().unwrap().clone())
    }
}

pub fn server_config() -> ServerConfig {
    ServerConfig {
        listen: "127.0.0.1:0".parse().unwrap(),
        public_url: "https://shop.example.com/".parse().unwrap(),
        return_secret: b"return-secret".to_vec().into_boxed_slice(),
        notice_inbox: 8,
        sessions: SessionLifetime {
            idle: Duration::from_secs(1800),
            confirmed: Duration::from_secs(300),
            sweep_every: Duration::from_secs(60),
        },
    }
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub storefront: Arc<FakeStorefront>,
    pub notices: NoticeReceiver,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_storefront(FakeStorefront::default())
    }

    pub fn with_storefront(storefront: FakeStorefront) -> Self {
        let storefront = Arc::new(storefront);
        let collaborators = Collaborators {
            directory: storefront.clone(),
            wallet: storefront.clone(),
            orders: storefront.clone(),
            payments: storefront.clone(),
        };
        let (notice_tx, notices) = notice_channel();
        let state = AppState::new(
            collaborators,
            SessionRegistry::new(),
            notice_tx,
            ConfigStore::new(CheckoutConfig::default()),
            ConfigStore::new(server_config()),
        );
        Self {
            router: build_router(state.clone()),
            state,
            storefront,
            notices,
        }
    }

    /// Send a request and decode the JSON response body (`Null` if empty).
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

pub fn cart_json() -> Value {
    serde_json::json!([{
        "id": "ci_rice",
        "productId": "rice",
        "name": "Rice",
        "quantity": 2,
        "price": "5000",
        "unit": "bag",
        "weight": "10"
    }])
}

pub fn address_json() -> Value {
    serde_json::json!({
        "id": "addr_1",
        "fullName": "Ada Obi",
        "phone": "+2348000000000",
        "street": "12 Marina Road",
        "city": "Lagos",
        "state": "Lagos"
    })
}
