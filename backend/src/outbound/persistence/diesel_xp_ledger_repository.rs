//! PostgreSQL-backed XP ledger.
//!
//! Every balance change, whether from a module, an achievement or a reward
//! debit, goes through [`apply_locked_delta`] inside the caller's
//! transaction. The row is created lazily and locked with `FOR UPDATE`
//! before the domain rule runs, so concurrent deltas for one user serialise.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::QueryResult;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{AppliedDelta, XpLedgerRepository, XpLedgerRepositoryError};
use crate::domain::{UserId, XpLedger};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::XpLedgerRow;
use super::pool::DbPool;
use super::schema::xp_ledgers;

/// Insert an empty ledger if none exists, then lock and return the row.
pub(super) async fn lock_ledger(
    conn: &mut AsyncPgConnection,
    user_id: &UserId,
    now: DateTime<Utc>,
) -> QueryResult<XpLedger> {
    diesel::insert_into(xp_ledgers::table)
        .values(XpLedgerRow::from(&XpLedger::empty(*user_id, now)))
        .on_conflict(xp_ledgers::user_id)
        .do_nothing()
        .execute(conn)
        .await?;

    let row: XpLedgerRow = xp_ledgers::table
        .find(*user_id.as_uuid())
        .select(XpLedgerRow::as_select())
        .for_update()
        .first(conn)
        .await?;
    Ok(row.into())
}

/// Lock the ledger row if there is one and read its balance.
///
/// Unlike [`lock_ledger`] this never creates the row; a user with no
/// ledger yet has a balance of zero.
pub(super) async fn locked_balance(
    conn: &mut AsyncPgConnection,
    user_id: &UserId,
) -> QueryResult<i64> {
    let total: Option<i64> = xp_ledgers::table
        .find(*user_id.as_uuid())
        .select(xp_ledgers::total_xp)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    Ok(total.unwrap_or(0))
}

/// Lock the ledger, apply `delta` with the domain rule and write it back.
///
/// Must run inside a transaction; the lock is held until it commits.
pub(super) async fn apply_locked_delta(
    conn: &mut AsyncPgConnection,
    user_id: &UserId,
    delta: i64,
    now: DateTime<Utc>,
) -> QueryResult<AppliedDelta> {
    let mut ledger = lock_ledger(conn, user_id, now).await?;
    let change = ledger.apply_delta(delta, now);
    diesel::update(xp_ledgers::table.find(*user_id.as_uuid()))
        .set(XpLedgerRow::from(&ledger))
        .execute(conn)
        .await?;
    Ok(AppliedDelta { ledger, change })
}

/// Diesel-backed implementation of [`XpLedgerRepository`].
#[derive(Clone)]
pub struct DieselXpLedgerRepository {
    pool: DbPool,
}

impl DieselXpLedgerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> XpLedgerRepositoryError {
    map_diesel_error(
        error,
        XpLedgerRepositoryError::query,
        XpLedgerRepositoryError::connection,
    )
}

#[async_trait]
impl XpLedgerRepository for DieselXpLedgerRepository {
    async fn find(&self, user_id: &UserId) -> Result<Option<XpLedger>, XpLedgerRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, XpLedgerRepositoryError::connection))?;

        let row: Option<XpLedgerRow> = xp_ledgers::table
            .find(*user_id.as_uuid())
            .select(XpLedgerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        Ok(row.map(XpLedger::from))
    }

    async fn apply_delta(
        &self,
        user_id: &UserId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<AppliedDelta, XpLedgerRepositoryError> {
        let mut pooled = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, XpLedgerRepositoryError::connection))?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction(|conn| {
            async move { apply_locked_delta(conn, user_id, delta, now).await }.scope_boxed()
        })
        .await
        .map_err(map_error)
    }
}
