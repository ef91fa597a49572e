//! Validated runtime configuration.
//!
//! Checkout tuning lives in [`shopfront_core::config::CheckoutConfig`];
//! what only the HTTP layer needs lives here.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub public_url: Url,
    /// Key for signing payment return URLs.
    pub return_secret: Box<[u8]>,
    pub notice_inbox: usize,
    pub sessions: SessionLifetime,
}

/// How long idle checkouts are kept and how often they are swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLifetime {
    pub idle: Duration,
    pub confirmed: Duration,
    pub sweep_every: Duration,
}

impl ServerConfig {
    pub fn return_secret_bytes(&self) -> &[u8] {
        &self.return_secret
    }
}

/// Storefront connection. Changes need a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    pub base_url: Url,
    pub api_token: String,
    pub timeout: Duration,
}
