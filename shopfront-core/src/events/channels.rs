//! Notice channel factory and handles.

use tokio::sync::mpsc;

use super::types::CheckoutNotice;

/// Default buffer size for the notice channel.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

pub type NoticeSender = mpsc::Sender<CheckoutNotice>;
pub type NoticeReceiver = mpsc::Receiver<CheckoutNotice>;

/// Create a notice channel. The sender may be cloned freely.
pub fn notice_channel() -> (NoticeSender, NoticeReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
