//! TOML file configuration structures.
//!
//! These structs directly map to the `shopfront-config.toml` file format.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::settings::DeliverySettings;
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub delivery_defaults: DeliveryDefaults,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Public base URL of this service, used to build payment return URLs.
    pub public_url: Url,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Storefront API the checkout calls into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: Url,
    pub api_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default = "default_verification_delay_secs")]
    pub verification_delay_secs: u64,
    #[serde(default = "default_reference_memory")]
    pub reference_memory: usize,
    /// Key for signing payment return URLs.
    pub return_url_secret: String,
    /// Undelivered notices kept per session.
    #[serde(default = "default_notice_inbox")]
    pub notice_inbox: usize,
    /// Seconds without a request before a checkout is dropped.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
    /// Seconds a confirmed checkout stays readable.
    #[serde(default = "default_confirmed_session_secs")]
    pub confirmed_session_secs: u64,
    #[serde(default = "default_session_sweep_secs")]
    pub session_sweep_secs: u64,
}

fn default_verification_delay_secs() -> u64 {
    3
}

fn default_reference_memory() -> usize {
    8
}

fn default_notice_inbox() -> usize {
    32
}

fn default_session_idle_secs() -> u64 {
    1800
}

fn default_confirmed_session_secs() -> u64 {
    300
}

fn default_session_sweep_secs() -> u64 {
    60
}

/// Delivery settings used when the storefront omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryDefaults {
    pub base_fee: Decimal,
    pub fee_per_kg: Decimal,
    pub fee_tier1: Decimal,
    pub fee_tier2: Decimal,
    pub fee_tier3: Decimal,
    pub minimum_order_quantity: u32,
    pub minimum_order_amount: Decimal,
    pub delivery_info_points: Vec<String>,
}

impl Default for DeliveryDefaults {
    fn default() -> Self {
        DeliverySettings::default().into()
    }
}

impl From<DeliverySettings> for DeliveryDefaults {
    fn from(s: DeliverySettings) -> Self {
        Self {
            base_fee: s.base_fee,
            fee_per_kg: s.fee_per_kg,
            fee_tier1: s.fee_tier1,
            fee_tier2: s.fee_tier2,
            fee_tier3: s.fee_tier3,
            minimum_order_quantity: s.minimum_order_quantity,
            minimum_order_amount: s.minimum_order_amount,
            delivery_info_points: s.delivery_info_points,
        }
    }
}

impl From<DeliveryDefaults> for DeliverySettings {
    fn from(d: DeliveryDefaults) -> Self {
        Self {
            base_fee: d.base_fee,
            fee_per_kg: d.fee_per_kg,
            fee_tier1: d.fee_tier1,
            fee_tier2: d.fee_tier2,
            fee_tier3: d.fee_tier3,
            minimum_order_quantity: d.minimum_order_quantity,
            minimum_order_amount: d.minimum_order_amount,
            delivery_info_points: d.delivery_info_points,
        }
    }
}

impl DeliveryDefaults {
    /// Names of amount fields holding a negative value.
    pub fn negative_fields(&self) -> Vec<&'static str> {
        [
            ("base_fee", self.base_fee),
            ("fee_per_kg", self.fee_per_kg),
            ("fee_tier1", self.fee_tier1),
            ("fee_tier2", self.fee_tier2),
            ("fee_tier3", self.fee_tier3),
            ("minimum_order_amount", self.minimum_order_amount),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_sign_negative() && !value.is_zero())
        .map(|(name, _)| name)
        .collect()
    }
}
