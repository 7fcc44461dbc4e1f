//! Sink that records each event as a structured log line.

use tracing::info;

use crate::domain::NotificationEvent;
use crate::domain::ports::NotificationSink;

/// Writes one `info!` line per event; the default when no delivery
/// channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn emit(&self, event: NotificationEvent) {
        info!(
            target: "progression::notifications",
            user_id = %event.user_id,
            kind = %event.kind,
            title = %event.title,
            body = %event.body,
            "notification emitted"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Module, ModuleId, TrailId, UserId};
    use rstest::rstest;

    #[rstest]
    fn emitting_never_panics_without_a_subscriber() {
        let module = Module {
            id: ModuleId::random(),
            trail_id: TrailId::random(),
            title: "Traits".to_owned(),
            order_index: 2,
            xp_reward: 40,
        };

        TracingNotificationSink.emit(NotificationEvent::module_completed(
            UserId::random(),
            &module,
        ));
    }
}
