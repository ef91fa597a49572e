//! Collaborators the checkout talks to.
//!
//! The server implements these over the storefront HTTP API; tests use
//! in-memory fakes.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shopfront_sdk::objects::{
    DeliverySettingsPayload, DeliverySlot, InitializePayment, OrderCreated, OrderDraft,
    PaymentInitialized, PaymentVerification,
};

use crate::errors::GatewayError;

#[async_trait]
pub trait DeliveryDirectory: Send + Sync {
    async fn delivery_settings(&self) -> Result<DeliverySettingsPayload, GatewayError>;

    async fn delivery_slots(&self) -> Result<Vec<DeliverySlot>, GatewayError>;
}

#[async_trait]
pub trait WalletLedger: Send + Sync {
    async fn balance(&self, customer_id: &str) -> Result<Decimal, GatewayError>;
}

#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderCreated, GatewayError>;
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn initialize(
        &self,
        request: &InitializePayment,
    ) -> Result<PaymentInitialized, GatewayError>;

    /// Check whether a hosted payment settled.
    async fn verify(&self, reference: &str) -> Result<PaymentVerification, GatewayError>;
}
