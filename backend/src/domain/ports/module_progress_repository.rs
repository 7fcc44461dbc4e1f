//! Port for per-user module progress rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Module, ModuleProgress, ModuleTransition, TargetStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by module progress repository adapters.
    pub enum ModuleProgressRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable,
            "module progress connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError,
            "module progress query failed: {message}",
    }
}

/// Port for writing module status and reading progress rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModuleProgressRepository: Send + Sync {
    /// Load or create the `(user, module)` row, apply
    /// [`ModuleProgress::transition`] and persist the result atomically.
    ///
    /// Concurrent writers to the same row are serialised, so exactly one of
    /// two racing completions observes the transition into `completed`.
    async fn record_status(
        &self,
        user_id: &UserId,
        module: &Module,
        target: TargetStatus,
        now: DateTime<Utc>,
    ) -> Result<ModuleTransition, ModuleProgressRepositoryError>;

    /// Every progress row the user has.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ModuleProgress>, ModuleProgressRepositoryError>;
}

/// Fixture implementation that computes transitions without persisting.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureModuleProgressRepository;

#[async_trait]
impl ModuleProgressRepository for FixtureModuleProgressRepository {
    async fn record_status(
        &self,
        user_id: &UserId,
        module: &Module,
        target: TargetStatus,
        now: DateTime<Utc>,
    ) -> Result<ModuleTransition, ModuleProgressRepositoryError> {
        Ok(ModuleProgress::not_started(*user_id, module).transition(module, target, now))
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<ModuleProgress>, ModuleProgressRepositoryError> {
        Ok(Vec::new())
    }
}
