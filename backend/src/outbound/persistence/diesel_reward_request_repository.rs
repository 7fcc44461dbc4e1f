//! PostgreSQL-backed reward requests.
//!
//! Creation locks the student's ledger row, if one exists, only to compare
//! the balance; it reserves nothing and never creates the row. Approval locks the request row, then the ledger row,
//! re-checks the balance and debits it with the status flip in the same
//! transaction. Lock order is always request before ledger.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{RewardRequestRepository, RewardRequestRepositoryError};
use crate::domain::{
    DecisionRecord, NewRewardRequest, RewardDecision, RewardRequest, RewardRequestId,
    RewardRequestStatus, UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_xp_ledger_repository::{apply_locked_delta, locked_balance};
use super::models::{NewRewardRequestRow, RewardDecisionUpdate, RewardRequestRow};
use super::pool::DbPool;
use super::schema::reward_requests;

/// Diesel-backed implementation of [`RewardRequestRepository`].
#[derive(Clone)]
pub struct DieselRewardRequestRepository {
    pool: DbPool,
}

impl DieselRewardRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> RewardRequestRepositoryError {
    map_diesel_error(
        error,
        RewardRequestRepositoryError::query,
        RewardRequestRepositoryError::connection,
    )
}

/// Transaction outcome: a database failure, or a domain refusal that must
/// roll the transaction back.
enum TxFailure {
    Diesel(diesel::result::Error),
    Refused(RewardRequestRepositoryError),
}

impl From<diesel::result::Error> for TxFailure {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

impl From<TxFailure> for RewardRequestRepositoryError {
    fn from(value: TxFailure) -> Self {
        match value {
            TxFailure::Diesel(error) => map_error(error),
            TxFailure::Refused(error) => error,
        }
    }
}

fn decode(row: RewardRequestRow) -> Result<RewardRequest, RewardRequestRepositoryError> {
    RewardRequest::try_from(row).map_err(|err| RewardRequestRepositoryError::query(err.to_string()))
}

fn decode_listing(rows: Vec<RewardRequestRow>) -> Vec<RewardRequest> {
    rows.into_iter()
        .filter_map(|row| match RewardRequest::try_from(row) {
            Ok(request) => Some(request),
            Err(err) => {
                warn!(error = %err, "skipping unreadable reward request");
                None
            }
        })
        .collect()
}

async fn ensure_affordable(
    conn: &mut AsyncPgConnection,
    student_id: &UserId,
    required: i64,
) -> Result<(), TxFailure> {
    let available = locked_balance(conn, student_id).await?;
    if available < required {
        return Err(TxFailure::Refused(
            RewardRequestRepositoryError::insufficient_points(required, available),
        ));
    }
    Ok(())
}

async fn decide_locked(
    conn: &mut AsyncPgConnection,
    decision: &DecisionRecord,
) -> Result<RewardRequest, TxFailure> {
    let row: Option<RewardRequestRow> = reward_requests::table
        .find(*decision.request_id.as_uuid())
        .select(RewardRequestRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let mut request = match row {
        Some(row) => decode(row).map_err(TxFailure::Refused)?,
        None => {
            return Err(TxFailure::Refused(RewardRequestRepositoryError::not_found(
                decision.request_id,
            )));
        }
    };
    if request.status != RewardRequestStatus::Pending {
        return Err(TxFailure::Refused(
            RewardRequestRepositoryError::already_decided(request.status),
        ));
    }

    let cost = request.points_cost();
    if decision.decision == RewardDecision::Approve {
        ensure_affordable(conn, &request.student_id, cost).await?;
    }

    request.apply_decision(decision).map_err(|err| {
        TxFailure::Refused(RewardRequestRepositoryError::already_decided(err.status))
    })?;
    diesel::update(reward_requests::table.find(*request.id.as_uuid()))
        .set(RewardDecisionUpdate::from_domain(&request))
        .execute(conn)
        .await?;

    if request.status == RewardRequestStatus::Approved {
        apply_locked_delta(conn, &request.student_id, -cost, decision.decided_at).await?;
    }
    Ok(request)
}

#[async_trait]
impl RewardRequestRepository for DieselRewardRequestRepository {
    async fn create_if_affordable(
        &self,
        request: NewRewardRequest,
    ) -> Result<RewardRequest, RewardRequestRepositoryError> {
        let mut pooled = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RewardRequestRepositoryError::connection))?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let required = request.points_cost();
        let created = request.into_request();

        let stored = conn
            .transaction(|conn| {
                async move {
                    ensure_affordable(conn, &created.student_id, required).await?;
                    diesel::insert_into(reward_requests::table)
                        .values(NewRewardRequestRow::from_domain(&created))
                        .execute(conn)
                        .await?;
                    Ok::<_, TxFailure>(created)
                }
                .scope_boxed()
            })
            .await?;
        Ok(stored)
    }

    async fn find(
        &self,
        id: &RewardRequestId,
    ) -> Result<Option<RewardRequest>, RewardRequestRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RewardRequestRepositoryError::connection))?;

        let row: Option<RewardRequestRow> = reward_requests::table
            .find(*id.as_uuid())
            .select(RewardRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        row.map(decode).transpose()
    }

    async fn list_for_student(
        &self,
        student_id: &UserId,
    ) -> Result<Vec<RewardRequest>, RewardRequestRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RewardRequestRepositoryError::connection))?;

        let rows: Vec<RewardRequestRow> = reward_requests::table
            .filter(reward_requests::student_id.eq(*student_id.as_uuid()))
            .select(RewardRequestRow::as_select())
            .order_by((reward_requests::created_at.desc(), reward_requests::id))
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(decode_listing(rows))
    }

    async fn list(
        &self,
        status: Option<RewardRequestStatus>,
    ) -> Result<Vec<RewardRequest>, RewardRequestRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RewardRequestRepositoryError::connection))?;

        let mut query = reward_requests::table
            .select(RewardRequestRow::as_select())
            .order_by((reward_requests::created_at.desc(), reward_requests::id))
            .into_boxed();
        if let Some(wanted) = status {
            query = query.filter(reward_requests::status.eq(wanted.as_str()));
        }
        let rows: Vec<RewardRequestRow> = query.load(&mut conn).await.map_err(map_error)?;
        Ok(decode_listing(rows))
    }

    async fn decide(
        &self,
        decision: &DecisionRecord,
    ) -> Result<RewardRequest, RewardRequestRepositoryError> {
        let mut pooled = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RewardRequestRepositoryError::connection))?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let decided = conn
            .transaction(|conn| async move { decide_locked(conn, decision).await }.scope_boxed())
            .await?;
        Ok(decided)
    }
}
