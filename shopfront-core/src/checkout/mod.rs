//! Checkout sessions and the three-step state machine.

mod loader;
mod references;
mod session;
mod step;

pub use loader::{CheckoutLoader, StartCheckout};
pub use references::ReferenceSet;
pub use session::{CheckoutSession, PlacementSnapshot, SessionHandle};
pub use step::CheckoutStep;
