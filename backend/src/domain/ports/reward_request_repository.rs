//! Port for reward redemption requests.
//!
//! Both mutating operations check the student's balance against a ledger
//! row locked for the duration of the operation. Creation only checks;
//! approval checks again and debits in the same unit of work.

use async_trait::async_trait;

use crate::domain::{
    DecisionRecord, NewRewardRequest, RewardRequest, RewardRequestId, RewardRequestStatus, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reward request repository adapters.
    pub enum RewardRequestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable,
            "reward request connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError,
            "reward request query failed: {message}",
        /// No request with the given identifier exists.
        NotFound { id: RewardRequestId } => NotFound,
            "reward request {id} not found",
        /// The request was already approved or rejected.
        AlreadyDecided { status: RewardRequestStatus } => InvalidState,
            "reward request already {status}",
        /// The locked balance is below the reward cost.
        InsufficientPoints { required: i64, available: i64 } => InsufficientPoints,
            "insufficient points: {required} required, {available} available",
    }
}

/// Port for creating, listing and deciding reward requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardRequestRepository: Send + Sync {
    /// Insert a pending request if the student's balance covers its cost.
    ///
    /// Nothing is reserved; the balance is only compared.
    async fn create_if_affordable(
        &self,
        request: NewRewardRequest,
    ) -> Result<RewardRequest, RewardRequestRepositoryError>;

    async fn find(
        &self,
        id: &RewardRequestId,
    ) -> Result<Option<RewardRequest>, RewardRequestRepositoryError>;

    /// A student's own requests, newest first.
    async fn list_for_student(
        &self,
        student_id: &UserId,
    ) -> Result<Vec<RewardRequest>, RewardRequestRepositoryError>;

    /// All requests, newest first, optionally narrowed to one status.
    async fn list(
        &self,
        status: Option<RewardRequestStatus>,
    ) -> Result<Vec<RewardRequest>, RewardRequestRepositoryError>;

    /// Apply a professor decision.
    ///
    /// Approval re-checks the balance and debits the cost together with the
    /// status change. On [`RewardRequestRepositoryError::InsufficientPoints`]
    /// the request stays pending and the ledger is untouched.
    async fn decide(
        &self,
        decision: &DecisionRecord,
    ) -> Result<RewardRequest, RewardRequestRepositoryError>;
}

/// Fixture implementation that accepts every request and knows none.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRewardRequestRepository;

#[async_trait]
impl RewardRequestRepository for FixtureRewardRequestRepository {
    async fn create_if_affordable(
        &self,
        request: NewRewardRequest,
    ) -> Result<RewardRequest, RewardRequestRepositoryError> {
        Ok(request.into_request())
    }

    async fn find(
        &self,
        _id: &RewardRequestId,
    ) -> Result<Option<RewardRequest>, RewardRequestRepositoryError> {
        Ok(None)
    }

    async fn list_for_student(
        &self,
        _student_id: &UserId,
    ) -> Result<Vec<RewardRequest>, RewardRequestRepositoryError> {
        Ok(Vec::new())
    }

    async fn list(
        &self,
        _status: Option<RewardRequestStatus>,
    ) -> Result<Vec<RewardRequest>, RewardRequestRepositoryError> {
        Ok(Vec::new())
    }

    async fn decide(
        &self,
        decision: &DecisionRecord,
    ) -> Result<RewardRequest, RewardRequestRepositoryError> {
        Err(RewardRequestRepositoryError::not_found(decision.request_id))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[case(RewardRequestRepositoryError::not_found(RewardRequestId::random()), ErrorCode::NotFound)]
    #[case(
        RewardRequestRepositoryError::already_decided(RewardRequestStatus::Approved),
        ErrorCode::InvalidState
    )]
    #[case(
        RewardRequestRepositoryError::insufficient_points(100_i64, 40_i64),
        ErrorCode::InsufficientPoints
    )]
    fn domain_outcomes_map_to_stable_codes(
        #[case] err: RewardRequestRepositoryError,
        #[case] code: ErrorCode,
    ) {
        assert_eq!(err.code(), code);
    }

    #[rstest]
    fn already_decided_names_the_status() {
        let err = RewardRequestRepositoryError::already_decided(RewardRequestStatus::Rejected);
        assert_eq!(err.to_string(), "reward request already rejected");
    }
}
