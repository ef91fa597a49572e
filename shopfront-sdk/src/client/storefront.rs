//! Storefront API client (checkout service → storefront backend).
//!
//! Every request carries the service's bearer token. Paths are relative so
//! `base_url` may include a prefix such as `https://shop.example.com/api/`.

use reqwest::Client;
use rust_decimal::Decimal;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::{
    DeliverySettingsPayload, DeliverySlot, InitializePayment, OrderCreated, OrderDraft,
    PaymentInitialized, PaymentVerification, WalletBalance,
};

/// Typed HTTP client for the upstream storefront API.
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    http: Client,
    base_url: Url,
    api_token: String,
}

impl StorefrontClient {
    /// Create a new `StorefrontClient`.
    ///
    /// * `base_url` – root URL of the storefront API; should end with `/`.
    /// * `api_token` – bearer token identifying the checkout service.
    pub fn new(base_url: Url, api_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_token: api_token.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET settings/delivery` – delivery fee and MOQ settings.
    #[tracing::instrument(skip_all, err, name = "HTTP:DeliverySettings")]
    pub async fn delivery_settings(&self) -> Result<DeliverySettingsPayload, ClientError> {
        let url = self.base_url.join("settings/delivery")?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `GET delivery-slots` – every configured delivery slot.
    #[tracing::instrument(skip_all, err, name = "HTTP:DeliverySlots")]
    pub async fn delivery_slots(&self) -> Result<Vec<DeliverySlot>, ClientError> {
        let url = self.base_url.join("delivery-slots")?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `GET wallet/{customer_id}/balance` – current wallet balance.
    #[tracing::instrument(skip_all, err, name = "HTTP:WalletBalance")]
    pub async fn wallet_balance(&self, customer_id: &str) -> Result<Decimal, ClientError> {
        let url = self.base_url.join(&format!(
            "wallet/{}/balance",
            urlencoding::encode(customer_id)
        ))?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let wallet: WalletBalance = parse_response(resp).await?;
        Ok(wallet.balance)
    }

    /// `POST orders` – create an order, debiting the wallet when the draft
    /// says so.
    #[tracing::instrument(skip_all, err, name = "HTTP:CreateOrder")]
    pub async fn create_order(&self, draft: &OrderDraft) -> Result<OrderCreated, ClientError> {
        let url = self.base_url.join("orders")?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_token)
            .json(draft)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST payments/initialize` – open a hosted payment.
    #[tracing::instrument(skip_all, err, name = "HTTP:InitializePayment")]
    pub async fn initialize_payment(
        &self,
        request: &InitializePayment,
    ) -> Result<PaymentInitialized, ClientError> {
        let url = self.base_url.join("payments/initialize")?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_token)
            .json(request)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `GET payments/verify/{reference}` – verify a hosted payment.
    ///
    /// Safe to call repeatedly; the storefront answers `alreadyProcessed`
    /// for references it has settled before.
    #[tracing::instrument(
        skip_all,
        err,
        name = "HTTP:VerifyPayment",
        fields(reference = %reference)
    )]
    pub async fn verify_payment(
        &self,
        reference: &str,
    ) -> Result<PaymentVerification, ClientError> {
        let url = self.base_url.join(&format!(
            "payments/verify/{}",
            urlencoding::encode(reference)
        ))?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        parse_response(resp).await
    }
}
