//! Test utilities for the progression crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for `cfg(test)` and behind the `test-support` feature.

mod clock;
mod ledger_store;
mod notifications;

pub use clock::MutableClock;
pub use ledger_store::InMemoryLedgerStore;
pub use notifications::RecordingNotificationSink;
