//! Sink that forwards events to a bounded tokio channel.
//!
//! A delivery worker owns the receiving half. When the channel is full or
//! the worker has gone away the event is dropped with a warning; emitting
//! never waits.

use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tracing::warn;

use crate::domain::NotificationEvent;
use crate::domain::ports::NotificationSink;

/// Bounded, non-blocking notification forwarder.
///
/// # Examples
///
/// ```
/// use progression::domain::ports::NotificationSink;
/// use progression::domain::{NotificationEvent, NotificationKind, UserId};
/// use progression::outbound::notifications::ChannelNotificationSink;
///
/// let (sink, mut receiver) = ChannelNotificationSink::new(8);
/// sink.emit(NotificationEvent {
///     user_id: UserId::random(),
///     kind: NotificationKind::RewardApproved,
///     title: "Recompensa aprovada".into(),
///     body: String::new(),
/// });
/// assert!(receiver.try_recv().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ChannelNotificationSink {
    sender: Sender<NotificationEvent>,
}

impl ChannelNotificationSink {
    /// Create a sink with room for `capacity` undelivered events.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> (Self, Receiver<NotificationEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl NotificationSink for ChannelNotificationSink {
    fn emit(&self, event: NotificationEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => warn!(
                user_id = %dropped.user_id,
                kind = %dropped.kind,
                "notification channel full; event dropped"
            ),
            Err(TrySendError::Closed(dropped)) => warn!(
                user_id = %dropped.user_id,
                kind = %dropped.kind,
                "notification channel closed; event dropped"
            ),
        }
    }
}
