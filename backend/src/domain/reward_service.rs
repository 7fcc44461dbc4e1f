//! Reward economy implementing the reward driving ports.
//!
//! Creation performs an advisory balance check and reserves nothing; the
//! authoritative check runs again, on a locked ledger row, when a professor
//! approves. Deciding an already-decided request is an error, never a
//! silent no-op.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    CreateRewardRequest, DecideRewardRequest, NotificationSink, RewardCommand, RewardQuery,
    RewardRequestRepository, RewardRequestRepositoryError,
};
use crate::domain::{
    Actor, DecisionRecord, EnginePorts, Error, NewRewardRequest, NotificationEvent, RewardRequest,
    RewardRequestId, RewardRequestStatus, RewardTypeInfo, Role, normalise_note, reward_catalogue,
};

fn map_reward_error(error: RewardRequestRepositoryError) -> Error {
    match error {
        RewardRequestRepositoryError::InsufficientPoints {
            required,
            available,
        } => Error::insufficient_points(required, available),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct RewardService {
    reward_repo: Arc<dyn RewardRequestRepository>,
    notifications: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl RewardService {
    pub fn new(ports: &EnginePorts, clock: Arc<dyn Clock>) -> Self {
        Self {
            reward_repo: Arc::clone(&ports.rewards),
            notifications: Arc::clone(&ports.notifications),
            clock,
        }
    }
}

#[async_trait]
impl RewardCommand for RewardService {
    async fn create_request(&self, request: CreateRewardRequest) -> Result<RewardRequest, Error> {
        let student_id = request.actor.require_student()?;
        let message = normalise_note(request.message, "message")?;

        let created = self
            .reward_repo
            .create_if_affordable(NewRewardRequest {
                id: RewardRequestId::random(),
                student_id,
                reward_type: request.reward_type,
                message,
                created_at: self.clock.utc(),
            })
            .await
            .map_err(map_reward_error)?;

        info!(
            request_id = %created.id,
            student_id = %student_id,
            reward_type = %created.reward_type,
            points_cost = created.points_cost(),
            "reward request created"
        );
        Ok(created)
    }

    async fn decide(&self, request: DecideRewardRequest) -> Result<RewardRequest, Error> {
        let professor_id = request.actor.require_professor()?;
        let response = normalise_note(request.response, "response")?;

        let decided = self
            .reward_repo
            .decide(&DecisionRecord {
                request_id: request.request_id,
                professor_id,
                decision: request.decision,
                response,
                decided_at: self.clock.utc(),
            })
            .await
            .map_err(map_reward_error)?;

        info!(
            request_id = %decided.id,
            professor_id = %professor_id,
            status = %decided.status,
            "reward request decided"
        );
        if let Some(event) = NotificationEvent::reward_decided(&decided) {
            self.notifications.emit(event);
        }
        Ok(decided)
    }
}

#[async_trait]
impl RewardQuery for RewardService {
    fn reward_types(&self) -> Vec<RewardTypeInfo> {
        reward_catalogue().to_vec()
    }

    async fn list_requests(
        &self,
        actor: Actor,
        status: Option<RewardRequestStatus>,
    ) -> Result<Vec<RewardRequest>, Error> {
        let requests = match actor.role {
            Role::Professor => self.reward_repo.list(status).await?,
            Role::Student => self
                .reward_repo
                .list_for_student(&actor.user_id)
                .await?
                .into_iter()
                .filter(|request| status.is_none_or(|status| request.status == status))
                .collect(),
        };
        Ok(requests)
    }
}

#[cfg(test)]
#[path = "reward_service_tests.rs"]
mod tests;
