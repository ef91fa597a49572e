//! Process signals: SIGTERM/SIGINT stop the server, SIGHUP reloads config.

use crate::config::{ConfigLoader, LoadedConfig};
use crate::state::AppState;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::Notify;

/// Resolves on the first SIGTERM or SIGINT.
///
/// Falls back to Ctrl+C if the Unix handlers cannot be installed.
pub async fn shutdown_signal() {
    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(
                    error = %e,
                    "Could not install signal handlers, waiting for Ctrl+C"
                );
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Could not listen for Ctrl+C");
                }
                return;
            }
        };

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    tracing::info!(signal = name, "Shutting down gracefully");
}

/// Swap reloadable sections into the live stores.
///
/// Upstream settings and the listen address need a restart.
fn apply_reload(state: &AppState, loaded: LoadedConfig) {
    let current_listen = state.server_config.snapshot().listen;
    if loaded.server.listen != current_listen {
        tracing::warn!(
            listen = %loaded.server.listen,
            "Listen address changed; restart to apply"
        );
    }
    state.server_config.update(loaded.server);
    state.checkout_config.update(loaded.checkout);
}

/// Reload configuration on every SIGHUP until the returned `Notify` fires.
pub fn spawn_config_reload_handler(
    state: AppState,
    config_loader: Arc<ConfigLoader>,
) -> Arc<Notify> {
    let stop = Arc::new(Notify::new());
    let stopped = stop.clone();

    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(sighup) => sighup,
            Err(e) => {
                tracing::error!(error = %e, "Could not install SIGHUP handler, reload disabled");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("SIGHUP received, reloading configuration");
                    match config_loader.reload() {
                        Ok(loaded) => {
                            apply_reload(&state, loaded);
                            tracing::info!(
                                version = state.checkout_config.version(),
                                "Configuration reloaded"
                            );
                        }
                        Err(e) => {
                            tracing::error!(
                            error = %e,
                            "Reload failed, keeping current configuration"
                        );
                        }
                    }
                }
                _ = stopped.notified() => {
                    tracing::debug!("Config reload handler stopping");
                    break;
                }
            }
        }
    });

    stop
}
