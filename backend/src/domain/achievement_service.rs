//! Achievement evaluator implementing the achievement driving ports.
//!
//! Evaluation reads the user's aggregates fresh on every call and diffs the
//! catalogue against existing grants; there is no cached achievement state.
//! Duplicate grants are prevented by the repository, so two concurrent
//! evaluations for the same user can both run safely.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AchievementCommand, AchievementQuery, AchievementRepository, CatalogueRepository,
    ModuleProgressRepository, NotificationSink, XpLedgerRepository,
};
use crate::domain::{
    Achievement, AchievementGrant, AchievementId, AchievementProgress, EarnedAchievement,
    EnginePorts, Error, GrantOutcome, NotificationEvent, UserId, UserStats, achievement_progress,
    earned_achievements, eligible_achievements,
};

#[derive(Clone)]
pub struct AchievementService {
    catalogue_repo: Arc<dyn CatalogueRepository>,
    progress_repo: Arc<dyn ModuleProgressRepository>,
    ledger_repo: Arc<dyn XpLedgerRepository>,
    achievement_repo: Arc<dyn AchievementRepository>,
    notifications: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl AchievementService {
    pub fn new(ports: &EnginePorts, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalogue_repo: Arc::clone(&ports.catalogue),
            progress_repo: Arc::clone(&ports.progress),
            ledger_repo: Arc::clone(&ports.ledger),
            achievement_repo: Arc::clone(&ports.achievements),
            notifications: Arc::clone(&ports.notifications),
            clock,
        }
    }

    async fn stats_with_grants(
        &self,
        user_id: &UserId,
    ) -> Result<(UserStats, Vec<AchievementGrant>), Error> {
        let modules = self.catalogue_repo.list_modules().await?;
        let progress = self.progress_repo.list_for_user(user_id).await?;
        let ledger = self.ledger_repo.find(user_id).await?;
        let grants = self.achievement_repo.list_grants(user_id).await?;
        let stats = UserStats::derive(&modules, &progress, ledger.as_ref(), grants.len());
        Ok((stats, grants))
    }

    /// Insert one grant and announce it if it was new.
    async fn grant(&self, user_id: &UserId, achievement: &Achievement) -> Result<bool, Error> {
        let inserted = self
            .achievement_repo
            .grant(user_id, achievement, self.clock.utc())
            .await?;
        if inserted {
            info!(
                user_id = %user_id,
                achievement = %achievement.title,
                xp_reward = achievement.xp_reward,
                "achievement granted"
            );
            self.notifications
                .emit(NotificationEvent::achievement_earned(*user_id, achievement));
        }
        Ok(inserted)
    }
}

#[async_trait]
impl AchievementCommand for AchievementService {
    async fn reevaluate(&self, user_id: &UserId) -> Result<Vec<Achievement>, Error> {
        let catalogue = self.achievement_repo.list_catalogue().await?;
        let (stats, grants) = self.stats_with_grants(user_id).await?;
        let held: HashSet<AchievementId> =
            grants.iter().map(|grant| grant.achievement_id).collect();

        let mut granted = Vec::new();
        for achievement in eligible_achievements(&catalogue, &held, &stats) {
            if self.grant(user_id, achievement).await? {
                granted.push(achievement.clone());
            }
        }
        Ok(granted)
    }

    async fn grant_by_title(&self, user_id: &UserId, title: &str) -> Result<GrantOutcome, Error> {
        let Some(achievement) = self.achievement_repo.find_by_title(title).await? else {
            warn!(user_id = %user_id, title, "grant requested for unknown achievement title");
            return Ok(GrantOutcome::NotGranted);
        };
        if self.grant(user_id, &achievement).await? {
            Ok(GrantOutcome::Granted(achievement))
        } else {
            Ok(GrantOutcome::NotGranted)
        }
    }
}

#[async_trait]
impl AchievementQuery for AchievementService {
    async fn user_stats(&self, user_id: &UserId) -> Result<UserStats, Error> {
        let (stats, _) = self.stats_with_grants(user_id).await?;
        Ok(stats)
    }

    async fn earned_achievements(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EarnedAchievement>, Error> {
        let catalogue = self.achievement_repo.list_catalogue().await?;
        let grants = self.achievement_repo.list_grants(user_id).await?;
        Ok(earned_achievements(&catalogue, &grants))
    }

    async fn catalogue_progress(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AchievementProgress>, Error> {
        let catalogue = self.achievement_repo.list_catalogue().await?;
        let (stats, grants) = self.stats_with_grants(user_id).await?;
        Ok(achievement_progress(&catalogue, &grants, &stats))
    }
}

#[cfg(test)]
#[path = "achievement_service_tests.rs"]
mod tests;
