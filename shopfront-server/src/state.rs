//! Application state shared across all request handlers.

use std::sync::Arc;

use shopfront_core::checkout::CheckoutLoader;
use shopfront_core::config::{CheckoutConfig, ConfigStore};
use shopfront_core::events::NoticeSender;
use shopfront_core::gateway::{DeliveryDirectory, OrderService, PaymentProvider, WalletLedger};
use shopfront_core::orchestrator::OrderPlacementOrchestrator;

use crate::config::runtime::ServerConfig;
use crate::sessions::SessionRegistry;
use crate::upstream::UpstreamGateway;

/// The external services a checkout needs.
#[derive(Clone)]
pub struct Collaborators {
    pub directory: Arc<dyn DeliveryDirectory>,
    pub wallet: Arc<dyn WalletLedger>,
    pub orders: Arc<dyn OrderService>,
    pub payments: Arc<dyn PaymentProvider>,
}

impl Collaborators {
    /// Serve every collaborator from the storefront API.
    pub fn upstream(gateway: UpstreamGateway) -> Self {
        let gateway = Arc::new(gateway);
        Self {
            directory: gateway.clone(),
            wallet: gateway.clone(),
            orders: gateway.clone(),
            payments: gateway,
        }
    }
}

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionRegistry,
    pub loader: CheckoutLoader,
    pub orchestrator: OrderPlacementOrchestrator,
    /// Settings source for cart-page quotes.
    pub directory: Arc<dyn DeliveryDirectory>,
    /// Reloaded on SIGHUP.
    pub checkout_config: ConfigStore<CheckoutConfig>,
    /// Reloaded on SIGHUP.
    pub server_config: ConfigStore<ServerConfig>,
}

impl AppState {
    pub fn new(
        collaborators: Collaborators,
        sessions: SessionRegistry,
        notices: NoticeSender,
        checkout_config: ConfigStore<CheckoutConfig>,
        server_config: ConfigStore<ServerConfig>,
    ) -> Self {
        let loader = CheckoutLoader::new(
            collaborators.directory.clone(),
            collaborators.wallet,
            checkout_config.clone(),
        );
        let orchestrator = OrderPlacementOrchestrator::new(
            collaborators.orders,
            collaborators.payments,
            notices,
            checkout_config.clone(),
        );
        Self {
            sessions,
            loader,
            orchestrator,
            directory: collaborators.directory,
            checkout_config,
            server_config,
        }
    }
}
