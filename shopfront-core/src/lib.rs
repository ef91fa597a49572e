#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod orchestrator;
pub mod pricing;
pub mod settings;
pub mod slots;

#[cfg(test)]
pub(crate) mod test_support;
