//! Outbound port for fire-and-forget user notifications.

use crate::domain::NotificationEvent;

/// One-way event sink.
///
/// `emit` never blocks on delivery and never fails: a sink that cannot
/// accept an event drops it and logs. The primary operation is never
/// affected by notification problems.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn emit(&self, event: NotificationEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationSink;

impl NotificationSink for FixtureNotificationSink {
    fn emit(&self, _event: NotificationEvent) {}
}
