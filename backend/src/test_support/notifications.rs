//! Notification sink that records events for assertions.

use std::sync::{Mutex, MutexGuard};

use crate::domain::ports::NotificationSink;
use crate::domain::{NotificationEvent, NotificationKind};

#[derive(Debug, Default)]
pub struct RecordingNotificationSink(Mutex<Vec<NotificationEvent>>);

impl RecordingNotificationSink {
    /// Every event emitted so far, in order.
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.lock_events().clone()
    }

    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.lock_events()
            .iter()
            .filter(|event| event.kind == kind)
            .count()
    }

    fn lock_events(&self) -> MutexGuard<'_, Vec<NotificationEvent>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn emit(&self, event: NotificationEvent) {
        self.lock_events().push(event);
    }
}
