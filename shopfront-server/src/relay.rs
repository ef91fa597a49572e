//! NoticeRelay processor.
//!
//! Moves checkout notices from the core's notice channel into the inbox of
//! the session they belong to, where the browser picks them up.

use shopfront_core::config::ConfigStore;
use shopfront_core::events::{CheckoutNotice, NoticeReceiver};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::runtime::ServerConfig;
use crate::sessions::SessionRegistry;

pub struct NoticeRelay {
    notice_rx: NoticeReceiver,
    sessions: SessionRegistry,
    server_config: ConfigStore<ServerConfig>,
    shutdown_rx: watch::Receiver<bool>,
}

impl NoticeRelay {
    pub fn new(
        notice_rx: NoticeReceiver,
        sessions: SessionRegistry,
        server_config: ConfigStore<ServerConfig>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            notice_rx,
            sessions,
            server_config,
            shutdown_rx,
        }
    }

    pub async fn run(mut self) {
        info!("NoticeRelay started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("NoticeRelay received shutdown signal");
                        break;
                    }
                }

                Some(notice) = self.notice_rx.recv() => {
                    self.deliver(notice).await;
                }

                else => {
                    info!("Notice channel closed");
                    break;
                }
            }
        }

        info!("NoticeRelay shutdown complete");
    }

    async fn deliver(&self, notice: CheckoutNotice) {
        let checkout_id = notice.checkout_id;
        let severity = notice.kind.severity();
        let capacity = self.server_config.snapshot().notice_inbox;
        if self.sessions.push_notice(notice, capacity).await {
            debug!(%checkout_id, ?severity, "Notice queued");
        } else {
            debug!(%checkout_id, "Notice for closed checkout dropped");
        }
    }
}
