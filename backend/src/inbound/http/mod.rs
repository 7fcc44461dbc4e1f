//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers parse and validate request DTOs, call a driving port from
//! [`state::HttpState`] and map the result back to a response DTO. Domain
//! errors become JSON payloads via the `ResponseError` impl in [`error`].

pub mod achievements;
pub mod actor;
pub mod error;
pub mod health;
pub mod progress;
pub mod rewards;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
