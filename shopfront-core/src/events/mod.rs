//! Checkout notices.
//!
//! Outcomes the shopper should be told about (toasts) are emitted as
//! [`CheckoutNotice`] values on a bounded channel. The hosting service
//! decides how they reach the browser.

pub mod channels;
pub mod types;

pub use channels::{DEFAULT_CHANNEL_BUFFER, NoticeReceiver, NoticeSender, notice_channel};
pub use types::{CheckoutNotice, NoticeKind, NoticeSeverity};
