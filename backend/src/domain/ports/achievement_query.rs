//! Driving port for user statistics and achievement read models.

use async_trait::async_trait;

use crate::domain::{AchievementProgress, EarnedAchievement, Error, UserId, UserStats};

/// Domain use-case port for reading stats and achievements.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AchievementQuery: Send + Sync {
    /// Aggregate statistics: XP, level, counts and streak.
    async fn user_stats(&self, user_id: &UserId) -> Result<UserStats, Error>;

    /// Achievements the user holds, newest first.
    async fn earned_achievements(&self, user_id: &UserId)
    -> Result<Vec<EarnedAchievement>, Error>;

    /// The whole catalogue annotated with the user's progress.
    async fn catalogue_progress(&self, user_id: &UserId)
    -> Result<Vec<AchievementProgress>, Error>;
}

/// Fixture query for a user with no history.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAchievementQuery;

#[async_trait]
impl AchievementQuery for FixtureAchievementQuery {
    async fn user_stats(&self, _user_id: &UserId) -> Result<UserStats, Error> {
        Ok(UserStats::derive(&[], &[], None, 0))
    }

    async fn earned_achievements(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<EarnedAchievement>, Error> {
        Ok(Vec::new())
    }

    async fn catalogue_progress(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<AchievementProgress>, Error> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_stats_start_at_level_one() {
        let stats = FixtureAchievementQuery
            .user_stats(&UserId::random())
            .await
            .expect("fixture stats");

        assert_eq!(stats.total_xp, 0);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.achievements_count, 0);
    }
}
