//! Reloadable config value with change notification.
//!
//! Readers take a cheap `Arc` snapshot and keep using it for the whole
//! operation, so a reload never changes values halfway through a checkout
//! step.

use std::sync::Arc;

use tokio::sync::watch;

/// A shared, versioned configuration value.
pub struct ConfigStore<T> {
    tx: Arc<watch::Sender<Versioned<T>>>,
}

struct Versioned<T> {
    version: u64,
    value: Arc<T>,
}

/// Receives notifications when a [`ConfigStore`] is updated.
pub struct ConfigWatcher<T> {
    rx: watch::Receiver<Versioned<T>>,
}

impl<T> ConfigStore<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(Versioned {
            version: 0,
            value: Arc::new(initial),
        });
        Self { tx: Arc::new(tx) }
    }

    /// Replace the stored value and notify all watchers.
    pub fn update(&self, value: T) {
        let value = Arc::new(value);
        self.tx.send_modify(|current| {
            current.version += 1;
            current.value = value;
        });
    }

    /// Current value.
    pub fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.tx.borrow().value)
    }

    pub fn version(&self) -> u64 {
        self.tx.borrow().version
    }

    pub fn subscribe(&self) -> ConfigWatcher<T> {
        ConfigWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T> Clone for ConfigStore<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> ConfigWatcher<T> {
    /// Wait for the next update and return the new value.
    ///
    /// Returns `Err` once every [`ConfigStore`] handle has been dropped.
    pub async fn changed(&mut self) -> Result<Arc<T>, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(Arc::clone(&self.rx.borrow_and_update().value))
    }
}
