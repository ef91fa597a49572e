//! Hosted-payment handoff.
//!
//! While the payment overlay is open two things can finish it: the
//! provider's success callback, or the shopper closing the overlay. Closing
//! starts one delayed verification that a callback arriving in the meantime
//! cancels. Both transitions are one-shot.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffState {
    AwaitingCustomer,
    OverlayClosed,
    CallbackReceived,
}

#[derive(Debug)]
pub struct PaymentHandoff {
    reference: String,
    state: watch::Sender<HandoffState>,
}

/// Resolves when the callback for a closed overlay arrives.
pub struct CallbackListener {
    rx: watch::Receiver<HandoffState>,
}

impl PaymentHandoff {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            state: watch::Sender::new(HandoffState::AwaitingCustomer),
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn state(&self) -> HandoffState {
        *self.state.borrow()
    }

    /// Returns `true` the first time only.
    pub fn record_callback(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == HandoffState::CallbackReceived {
                return false;
            }
            *state = HandoffState::CallbackReceived;
            true
        })
    }

    /// Returns a listener the first time the overlay closes before any
    /// callback, `None` otherwise.
    pub fn record_close(&self) -> Option<CallbackListener> {
        let closed = self.state.send_if_modified(|state| {
            if *state != HandoffState::AwaitingCustomer {
                return false;
            }
            *state = HandoffState::OverlayClosed;
            true
        });
        closed.then(|| CallbackListener {
            rx: self.state.subscribe(),
        })
    }
}

impl CallbackListener {
    /// Wait for the callback. Never resolves if the handoff is dropped
    /// without one.
    pub async fn callback_received(mut self) {
        if self
            .rx
            .wait_for(|state| *state == HandoffState::CallbackReceived)
            .await
            .is_err()
        {
            std::future::pending::<()>().await;
        }
    }
}
