//! Learning-progress and rewards backend.
//!
//! Students complete modules grouped into trails and earn XP; XP drives
//! levels, streaks and threshold achievements; accumulated points can be
//! redeemed for rewards that a professor approves or rejects.
//!
//! The crate follows a hexagonal layout:
//! - [`domain`]: entities, rules, ports and the services behind them.
//! - [`inbound`]: the actix-web HTTP adapter.
//! - [`outbound`]: Diesel persistence and notification sinks.
//! - [`middleware`]: request-scoped trace correlation.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
