//! Notification sink adapters.
//!
//! Delivery is best effort: both sinks accept every event synchronously and
//! never report failure back to the engine.

mod channel;
mod tracing_sink;

pub use channel::ChannelNotificationSink;
pub use tracing_sink::TracingNotificationSink;
