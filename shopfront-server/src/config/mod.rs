//! Configuration module for shopfront-server.
//!
//! Handles loading configuration from TOML files and CLI arguments.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::{ServerConfig, SessionLifetime, UpstreamConfig};
use shopfront_core::config::CheckoutConfig;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub checkout: CheckoutConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Read, override, validate and convert the config file.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn load_str(&self, content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;
        Ok(build_loaded_config(file_config))
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.checkout.return_url_secret.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "checkout.return_url_secret must not be empty".to_string(),
        ));
    }
    if config.checkout.reference_memory == 0 {
        return Err(ConfigError::ValidationError(
            "checkout.reference_memory must be at least 1".to_string(),
        ));
    }
    if config.checkout.session_idle_secs == 0 || config.checkout.session_sweep_secs == 0 {
        return Err(ConfigError::ValidationError(
            "checkout.session_idle_secs and checkout.session_sweep_secs must be positive"
                .to_string(),
        ));
    }
    if config.upstream.base_url.cannot_be_a_base() {
        return Err(ConfigError::ValidationError(format!(
            "upstream.base_url {} cannot be used as a base URL",
            config.upstream.base_url
        )));
    }
    let negative = config.delivery_defaults.negative_fields();
    if !negative.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "delivery_defaults must not be negative: {}",
            negative.join(", ")
        )));
    }
    Ok(())
}

/// `Url::join` drops the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: url::Url) -> url::Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
            public_url: with_trailing_slash(file_config.server.public_url),
            return_secret: file_config
                .checkout
                .return_url_secret
                .into_bytes()
                .into_boxed_slice(),
            notice_inbox: file_config.checkout.notice_inbox.max(1),
            sessions: SessionLifetime {
                idle: Duration::from_secs(file_config.checkout.session_idle_secs),
                confirmed: Duration::from_secs(file_config.checkout.confirmed_session_secs),
                sweep_every: Duration::from_secs(file_config.checkout.session_sweep_secs),
            },
        },
        upstream: UpstreamConfig {
            base_url: with_trailing_slash(file_config.upstream.base_url),
            api_token: file_config.upstream.api_token,
            timeout: Duration::from_secs(file_config.upstream.timeout_secs),
        },
        checkout: CheckoutConfig {
            verification_delay: Duration::from_secs(file_config.checkout.verification_delay_secs),
            reference_memory: file_config.checkout.reference_memory,
            fallback_settings: file_config.delivery_defaults.into(),
        },
    }
}
