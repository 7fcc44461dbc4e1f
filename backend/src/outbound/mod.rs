//! Outbound adapters implementing the engine's driven ports.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **notifications**: log-based and channel-based notification sinks
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations; the gamification rules stay in the domain.

pub mod notifications;
pub mod persistence;
