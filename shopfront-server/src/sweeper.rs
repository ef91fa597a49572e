//! SessionSweeper processor.
//!
//! Periodically drops checkouts nobody has touched for a while, and
//! confirmed checkouts once the shopper has had time to read them.

use shopfront_core::config::ConfigStore;
use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::runtime::ServerConfig;
use crate::sessions::SessionRegistry;

pub struct SessionSweeper {
    sessions: SessionRegistry,
    server_config: ConfigStore<ServerConfig>,
    shutdown_rx: watch::Receiver<bool>,
}

fn ticker(period: std::time::Duration) -> Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

impl SessionSweeper {
    pub fn new(
        sessions: SessionRegistry,
        server_config: ConfigStore<ServerConfig>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            sessions,
            server_config,
            shutdown_rx,
        }
    }

    pub async fn run(mut self) {
        let mut period = self.server_config.snapshot().sessions.sweep_every;
        let mut interval = ticker(period);
        info!(?period, "SessionSweeper started");

        loop {
            tokio::select! {
                biased;

                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("SessionSweeper received shutdown signal");
                        break;
                    }
                }

                _ = interval.tick() => {
                    let lifetime = self.server_config.snapshot().sessions;
                    let expired = self.sessions.sweep(lifetime).await;
                    if !expired.is_empty() {
                        info!(count = expired.len(), "Expired idle checkouts");
                    }
                    for checkout_id in expired {
                        debug!(%checkout_id, "Checkout expired");
                    }

                    if lifetime.sweep_every != period {
                        period = lifetime.sweep_every;
                        interval = ticker(period);
                        debug!(?period, "Sweep period changed");
                    }
                }
            }
        }

        info!("SessionSweeper shutdown complete");
    }
}
