//! Driving port for the reward redemption workflow.

use async_trait::async_trait;

use crate::domain::{Actor, Error, RewardDecision, RewardRequest, RewardRequestId, RewardType};

/// A student's request to redeem points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRewardRequest {
    pub actor: Actor,
    pub reward_type: RewardType,
    pub message: Option<String>,
}

/// A professor's verdict on a pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecideRewardRequest {
    pub actor: Actor,
    pub request_id: RewardRequestId,
    pub decision: RewardDecision,
    pub response: Option<String>,
}

/// Domain use-case port for creating and deciding reward requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardCommand: Send + Sync {
    /// Create a pending request after an advisory balance check.
    ///
    /// Only students may call this. Fails with `insufficient_points` when
    /// the current balance is below the reward's cost.
    async fn create_request(&self, request: CreateRewardRequest) -> Result<RewardRequest, Error>;

    /// Approve or reject a pending request.
    ///
    /// Only professors may call this. Deciding twice fails with
    /// `invalid_state`; an approval the balance no longer covers fails with
    /// `insufficient_points` and leaves the request pending.
    async fn decide(&self, request: DecideRewardRequest) -> Result<RewardRequest, Error>;
}

/// Fixture command that accepts requests without persisting them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRewardCommand;

#[async_trait]
impl RewardCommand for FixtureRewardCommand {
    async fn create_request(&self, request: CreateRewardRequest) -> Result<RewardRequest, Error> {
        let student_id = request.actor.require_student()?;
        let now = chrono::Utc::now();
        Ok(crate::domain::NewRewardRequest {
            id: RewardRequestId::random(),
            student_id,
            reward_type: request.reward_type,
            message: request.message,
            created_at: now,
        }
        .into_request())
    }

    async fn decide(&self, request: DecideRewardRequest) -> Result<RewardRequest, Error> {
        request.actor.require_professor()?;
        Err(Error::not_found(format!(
            "reward request {} not found",
            request.request_id
        )))
    }
}
