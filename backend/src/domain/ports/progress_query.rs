//! Driving port for trail and module read models.
//!
//! Lock state and trail percentages are derived from progress rows on every
//! call; nothing returned here is stored.

use async_trait::async_trait;

use crate::domain::{Error, ModuleView, TrailId, TrailProgress, UserId};

/// Domain use-case port for reading progress.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressQuery: Send + Sync {
    /// Every trail with the user's derived completion summary.
    async fn list_trails(&self, user_id: &UserId) -> Result<Vec<TrailProgress>, Error>;

    /// Modules of one trail in order, with status and lock state.
    ///
    /// Fails with `not_found` when the trail does not exist.
    async fn list_modules(
        &self,
        user_id: &UserId,
        trail_id: &TrailId,
    ) -> Result<Vec<ModuleView>, Error>;
}

/// Fixture query over an empty catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProgressQuery;

#[async_trait]
impl ProgressQuery for FixtureProgressQuery {
    async fn list_trails(&self, _user_id: &UserId) -> Result<Vec<TrailProgress>, Error> {
        Ok(Vec::new())
    }

    async fn list_modules(
        &self,
        _user_id: &UserId,
        trail_id: &TrailId,
    ) -> Result<Vec<ModuleView>, Error> {
        Err(Error::not_found(format!("trail {trail_id} not found")))
    }
}
