//! Driving port for module status writes.
//!
//! A status write is the entry point of the progression flow: the progress
//! row is committed first, then the XP delta, then achievements are
//! re-evaluated against the updated aggregates.

use async_trait::async_trait;

use crate::domain::{
    Achievement, Actor, Error, ModuleId, ModuleProgress, ModuleStatus, TargetStatus, level_for_xp,
};

/// Request to move a module into `in_progress` or `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetModuleStatusRequest {
    pub actor: Actor,
    pub module_id: ModuleId,
    pub status: TargetStatus,
}

/// Outcome of a status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetModuleStatusResponse {
    pub progress: ModuleProgress,
    pub previous_status: ModuleStatus,
    /// Signed XP delta the transition produced.
    pub xp_delta: i64,
    /// Ledger total once the delta and any achievement rewards landed.
    pub total_xp: i64,
    pub level: i32,
    /// Achievements granted by the re-evaluation this write triggered.
    pub granted: Vec<Achievement>,
}

/// Domain use-case port for recording module progress.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressCommand: Send + Sync {
    /// Record the caller's status on a module.
    ///
    /// Fails with `not_found` when the module does not exist.
    async fn set_module_status(
        &self,
        request: SetModuleStatusRequest,
    ) -> Result<SetModuleStatusResponse, Error>;
}

/// Fixture command that knows no modules.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProgressCommand;

#[async_trait]
impl ProgressCommand for FixtureProgressCommand {
    async fn set_module_status(
        &self,
        request: SetModuleStatusRequest,
    ) -> Result<SetModuleStatusResponse, Error> {
        Err(Error::not_found(format!("module {} not found", request.module_id)))
    }
}

impl SetModuleStatusResponse {
    /// Response for a write that left the ledger at `total_xp`.
    pub fn new(
        progress: ModuleProgress,
        previous_status: ModuleStatus,
        xp_delta: i64,
        total_xp: i64,
        granted: Vec<Achievement>,
    ) -> Self {
        Self {
            progress,
            previous_status,
            xp_delta,
            total_xp,
            level: level_for_xp(total_xp),
            granted,
        }
    }
}
