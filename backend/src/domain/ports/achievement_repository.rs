//! Port for the achievement catalogue and per-user grants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Achievement, AchievementGrant, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by achievement repository adapters.
    pub enum AchievementRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable,
            "achievement repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError,
            "achievement repository query failed: {message}",
    }
}

/// Port for reading the catalogue and recording grants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Every catalogue entry, ordered by kind then requirement.
    async fn list_catalogue(&self) -> Result<Vec<Achievement>, AchievementRepositoryError>;

    async fn find_by_title(
        &self,
        title: &str,
    ) -> Result<Option<Achievement>, AchievementRepositoryError>;

    async fn list_grants(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AchievementGrant>, AchievementRepositoryError>;

    /// Insert the `(user, achievement)` grant and credit its XP reward.
    ///
    /// Returns `false` without touching the ledger when the grant already
    /// exists. The uniqueness of the pair is enforced by storage, and the
    /// grant and the XP credit commit together or not at all.
    async fn grant(
        &self,
        user_id: &UserId,
        achievement: &Achievement,
        now: DateTime<Utc>,
    ) -> Result<bool, AchievementRepositoryError>;
}

/// Fixture implementation with an empty catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAchievementRepository;

#[async_trait]
impl AchievementRepository for FixtureAchievementRepository {
    async fn list_catalogue(&self) -> Result<Vec<Achievement>, AchievementRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_title(
        &self,
        _title: &str,
    ) -> Result<Option<Achievement>, AchievementRepositoryError> {
        Ok(None)
    }

    async fn list_grants(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<AchievementGrant>, AchievementRepositoryError> {
        Ok(Vec::new())
    }

    async fn grant(
        &self,
        _user_id: &UserId,
        _achievement: &Achievement,
        _now: DateTime<Utc>,
    ) -> Result<bool, AchievementRepositoryError> {
        Ok(false)
    }
}
