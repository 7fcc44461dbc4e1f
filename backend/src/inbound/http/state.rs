//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::EngineServices;
use crate::domain::ports::{
    AchievementCommand, AchievementQuery, FixtureAchievementCommand, FixtureAchievementQuery,
    FixtureProgressCommand, FixtureProgressQuery, FixtureRewardCommand, FixtureRewardQuery,
    ProgressCommand, ProgressQuery, RewardCommand, RewardQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub progress: Arc<dyn ProgressCommand>,
    pub progress_query: Arc<dyn ProgressQuery>,
    pub achievements: Arc<dyn AchievementCommand>,
    pub achievements_query: Arc<dyn AchievementQuery>,
    pub rewards: Arc<dyn RewardCommand>,
    pub rewards_query: Arc<dyn RewardQuery>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            progress: Arc::new(FixtureProgressCommand),
            progress_query: Arc::new(FixtureProgressQuery),
            achievements: Arc::new(FixtureAchievementCommand),
            achievements_query: Arc::new(FixtureAchievementQuery),
            rewards: Arc::new(FixtureRewardCommand),
            rewards_query: Arc::new(FixtureRewardQuery),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub progress: Arc<dyn ProgressCommand>,
    pub progress_query: Arc<dyn ProgressQuery>,
    pub achievements: Arc<dyn AchievementCommand>,
    pub achievements_query: Arc<dyn AchievementQuery>,
    pub rewards: Arc<dyn RewardCommand>,
    pub rewards_query: Arc<dyn RewardQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use progression::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts::default());
    /// assert!(!state.rewards_query.reward_types().is_empty());
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            progress,
            progress_query,
            achievements,
            achievements_query,
            rewards,
            rewards_query,
        } = ports;
        Self {
            progress,
            progress_query,
            achievements,
            achievements_query,
            rewards,
            rewards_query,
        }
    }

    /// Point every port at the wired engine services.
    pub fn from_engine(services: &EngineServices) -> Self {
        Self::new(HttpStatePorts {
            progress: services.progress.clone(),
            progress_query: services.progress.clone(),
            achievements: services.achievements.clone(),
            achievements_query: services.achievements.clone(),
            rewards: services.rewards.clone(),
            rewards_query: services.rewards.clone(),
        })
    }
}
