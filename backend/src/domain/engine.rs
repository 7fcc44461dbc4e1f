//! Port bundle and service wiring for the progression engine.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AchievementRepository, CatalogueRepository, ModuleProgressRepository, NotificationSink,
    RewardRequestRepository, XpLedgerRepository,
};
use crate::domain::{AchievementService, ProgressService, RewardService, XpLedgerService};

/// Driven ports required by the engine services.
#[derive(Clone)]
pub struct EnginePorts {
    /// Read-only trail and module catalogue.
    pub catalogue: Arc<dyn CatalogueRepository>,
    /// Per-user module progress rows.
    pub progress: Arc<dyn ModuleProgressRepository>,
    /// Per-user XP ledger rows.
    pub ledger: Arc<dyn XpLedgerRepository>,
    /// Achievement catalogue and grants.
    pub achievements: Arc<dyn AchievementRepository>,
    /// Reward redemption requests.
    pub rewards: Arc<dyn RewardRequestRepository>,
    /// Fire-and-forget user notifications.
    pub notifications: Arc<dyn NotificationSink>,
}

/// Engine services sharing one set of ports and one clock.
#[derive(Clone)]
pub struct EngineServices {
    pub progress: Arc<ProgressService>,
    pub achievements: Arc<AchievementService>,
    pub rewards: Arc<RewardService>,
}

impl EngineServices {
    /// Wire the services.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use progression::domain::ports::{
    ///     FixtureAchievementRepository, FixtureCatalogueRepository,
    ///     FixtureModuleProgressRepository, FixtureNotificationSink,
    ///     FixtureRewardRequestRepository, FixtureXpLedgerRepository,
    /// };
    /// use progression::domain::{EnginePorts, EngineServices};
    ///
    /// let services = EngineServices::new(
    ///     EnginePorts {
    ///         catalogue: Arc::new(FixtureCatalogueRepository),
    ///         progress: Arc::new(FixtureModuleProgressRepository),
    ///         ledger: Arc::new(FixtureXpLedgerRepository),
    ///         achievements: Arc::new(FixtureAchievementRepository),
    ///         rewards: Arc::new(FixtureRewardRequestRepository),
    ///         notifications: Arc::new(FixtureNotificationSink),
    ///     },
    ///     Arc::new(DefaultClock),
    /// );
    /// assert_eq!(Arc::strong_count(&services.achievements), 2);
    /// ```
    pub fn new(ports: EnginePorts, clock: Arc<dyn Clock>) -> Self {
        let achievements = Arc::new(AchievementService::new(&ports, Arc::clone(&clock)));
        let xp = XpLedgerService::new(Arc::clone(&ports.ledger), Arc::clone(&clock));
        let progress = Arc::new(ProgressService::new(
            &ports,
            xp,
            achievements.clone(),
            Arc::clone(&clock),
        ));
        let rewards = Arc::new(RewardService::new(&ports, clock));
        Self {
            progress,
            achievements,
            rewards,
        }
    }
}
