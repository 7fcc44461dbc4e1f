//! Driving port for reward catalogue and request listings.

use async_trait::async_trait;

use crate::domain::{Actor, Error, RewardRequest, RewardRequestStatus, RewardTypeInfo};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardQuery: Send + Sync {
    /// The reward-type catalogue with costs.
    fn reward_types(&self) -> Vec<RewardTypeInfo>;

    /// Requests visible to the caller, newest first.
    ///
    /// Students see their own requests; professors see everyone's. The
    /// optional status narrows either listing.
    async fn list_requests(
        &self,
        actor: Actor,
        status: Option<RewardRequestStatus>,
    ) -> Result<Vec<RewardRequest>, Error>;
}

/// Fixture query with the built-in catalogue and no requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRewardQuery;

#[async_trait]
impl RewardQuery for FixtureRewardQuery {
    fn reward_types(&self) -> Vec<RewardTypeInfo> {
        crate::domain::reward_catalogue().to_vec()
    }

    async fn list_requests(
        &self,
        _actor: Actor,
        _status: Option<RewardRequestStatus>,
    ) -> Result<Vec<RewardRequest>, Error> {
        Ok(Vec::new())
    }
}
