//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the engine's repository ports backed by
//! PostgreSQL via `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types. The XP arithmetic, module transitions and request state machine
//!   stay in the domain and run here on locked rows.
//! - **One transaction per port call**: a grant and its XP credit, or a
//!   decision and its debit, commit together or not at all.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//!
//! # Example
//!
//! ```rust,no_run
//! use progression::outbound::persistence::{DbPool, PoolConfig, diesel_engine_ports};
//! use progression::outbound::notifications::TracingNotificationSink;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/progression")).await?;
//! let ports = diesel_engine_ports(&pool, Arc::new(TracingNotificationSink));
//! # let _ = ports;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::domain::EnginePorts;
use crate::domain::ports::NotificationSink;

mod diesel_achievement_repository;
mod diesel_catalogue_repository;
mod diesel_error_mapping;
mod diesel_module_progress_repository;
mod diesel_reward_request_repository;
mod diesel_xp_ledger_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_achievement_repository::DieselAchievementRepository;
pub use diesel_catalogue_repository::DieselCatalogueRepository;
pub use diesel_module_progress_repository::DieselModuleProgressRepository;
pub use diesel_reward_request_repository::DieselRewardRequestRepository;
pub use diesel_xp_ledger_repository::DieselXpLedgerRepository;
pub use migrations::{MIGRATIONS, MigrationError, migrate, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

/// Wire every repository port to the shared pool.
pub fn diesel_engine_ports(
    pool: &DbPool,
    notifications: Arc<dyn NotificationSink>,
) -> EnginePorts {
    EnginePorts {
        catalogue: Arc::new(DieselCatalogueRepository::new(pool.clone())),
        progress: Arc::new(DieselModuleProgressRepository::new(pool.clone())),
        ledger: Arc::new(DieselXpLedgerRepository::new(pool.clone())),
        achievements: Arc::new(DieselAchievementRepository::new(pool.clone())),
        rewards: Arc::new(DieselRewardRequestRepository::new(pool.clone())),
        notifications,
    }
}
