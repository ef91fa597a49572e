//! Runtime configuration of the checkout core.
//!
//! These are validated values. Loading and parsing the config file is the
//! server's job.

mod checkout;
mod config_store;

pub use checkout::CheckoutConfig;
pub use config_store::{ConfigStore, ConfigWatcher};
