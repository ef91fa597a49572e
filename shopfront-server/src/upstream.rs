//! Storefront API adapter for the checkout collaborator traits.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shopfront_core::errors::GatewayError;
use shopfront_core::gateway::{DeliveryDirectory, OrderService, PaymentProvider, WalletLedger};
use shopfront_sdk::client::{ClientError, StorefrontClient};
use shopfront_sdk::objects::{
    DeliverySettingsPayload, DeliverySlot, InitializePayment, OrderCreated, OrderDraft,
    PaymentInitialized, PaymentVerification,
};

use crate::config::runtime::UpstreamConfig;

/// Every checkout collaborator, served by the storefront API.
#[derive(Debug, Clone)]
pub struct UpstreamGateway {
    client: StorefrontClient,
}

impl UpstreamGateway {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client: StorefrontClient::new(config.base_url.clone(), config.api_token.clone())
                .with_http_client(http),
        })
    }
}

fn to_gateway_error(err: ClientError) -> GatewayError {
    match err {
        ClientError::Api { status, body } => GatewayError::Rejected {
            status: status.as_u16(),
            message: body,
        },
        ClientError::Http(e) => GatewayError::Unavailable(e.to_string()),
        ClientError::Json(e) => GatewayError::Malformed(e.to_string()),
        ClientError::Url(e) => GatewayError::Malformed(e.to_string()),
    }
}

#[async_trait]
impl DeliveryDirectory for UpstreamGateway {
    async fn delivery_settings(&self) -> Result<DeliverySettingsPayload, GatewayError> {
        self.client
            .delivery_settings()
            .await
            .map_err(to_gateway_error)
    }

    async fn delivery_slots(&self) -> Result<Vec<DeliverySlot>, GatewayError> {
        self.client.delivery_slots().await.map_err(to_gateway_error)
    }
}

#[async_trait]
impl WalletLedger for UpstreamGateway {
    async fn balance(&self, customer_id: &str) -> Result<Decimal, GatewayError> {
        self.client
            .wallet_balance(customer_id)
            .await
            .map_err(to_gateway_error)
    }
}

#[async_trait]
impl OrderService for UpstreamGateway {
    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderCreated, GatewayError> {
        self.client
            .create_order(draft)
            .await
            .map_err(to_gateway_error)
    }
}

#[async_trait]
impl PaymentProvider for UpstreamGateway {
    async fn initialize(
        &self,
        request: &InitializePayment,
    ) -> Result<PaymentInitialized, GatewayError> {
        self.client
            .initialize_payment(request)
            .await
            .map_err(to_gateway_error)
    }

    async fn verify(&self, reference: &str) -> Result<PaymentVerification, GatewayError> {
        self.client
            .verify_payment(reference)
            .await
            .map_err(to_gateway_error)
    }
}
