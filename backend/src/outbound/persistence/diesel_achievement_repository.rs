//! PostgreSQL-backed achievement catalogue and grants.
//!
//! The `(user_id, achievement_id)` primary key is the idempotence guard: a
//! grant inserts with `ON CONFLICT DO NOTHING` and only credits the reward
//! when a row was actually written, in the same transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{AchievementRepository, AchievementRepositoryError};
use crate::domain::{Achievement, AchievementGrant, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_xp_ledger_repository::apply_locked_delta;
use super::models::{AchievementGrantRow, AchievementRow};
use super::pool::DbPool;
use super::schema::{achievement_grants, achievements};

/// Diesel-backed implementation of [`AchievementRepository`].
#[derive(Clone)]
pub struct DieselAchievementRepository {
    pool: DbPool,
}

impl DieselAchievementRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> AchievementRepositoryError {
    map_diesel_error(
        error,
        AchievementRepositoryError::query,
        AchievementRepositoryError::connection,
    )
}

fn decode(row: AchievementRow) -> Result<Achievement, AchievementRepositoryError> {
    Achievement::try_from(row).map_err(|err| AchievementRepositoryError::query(err.to_string()))
}

#[async_trait]
impl AchievementRepository for DieselAchievementRepository {
    async fn list_catalogue(&self) -> Result<Vec<Achievement>, AchievementRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AchievementRepositoryError::connection))?;

        let rows: Vec<AchievementRow> = achievements::table
            .select(AchievementRow::as_select())
            .order_by((
                achievements::kind,
                achievements::requirement_value,
                achievements::title,
            ))
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        // An unknown kind hides one entry rather than the whole catalogue.
        Ok(rows
            .into_iter()
            .filter_map(|row| match Achievement::try_from(row) {
                Ok(achievement) => Some(achievement),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable achievement");
                    None
                }
            })
            .collect())
    }

    async fn find_by_title(
        &self,
        title: &str,
    ) -> Result<Option<Achievement>, AchievementRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AchievementRepositoryError::connection))?;

        let row: Option<AchievementRow> = achievements::table
            .filter(achievements::title.eq(title))
            .select(AchievementRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        row.map(decode).transpose()
    }

    async fn list_grants(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AchievementGrant>, AchievementRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AchievementRepositoryError::connection))?;

        let rows: Vec<AchievementGrantRow> = achievement_grants::table
            .filter(achievement_grants::user_id.eq(*user_id.as_uuid()))
            .select(AchievementGrantRow::as_select())
            .order_by(achievement_grants::earned_at)
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(rows.into_iter().map(AchievementGrant::from).collect())
    }

    async fn grant(
        &self,
        user_id: &UserId,
        achievement: &Achievement,
        now: DateTime<Utc>,
    ) -> Result<bool, AchievementRepositoryError> {
        let mut pooled = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AchievementRepositoryError::connection))?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let row = AchievementGrantRow {
            user_id: *user_id.as_uuid(),
            achievement_id: *achievement.id.as_uuid(),
            earned_at: now,
        };
        let reward = achievement.xp_reward;

        conn.transaction(|conn| {
            async move {
                let inserted = diesel::insert_into(achievement_grants::table)
                    .values(&row)
                    .on_conflict((achievement_grants::user_id, achievement_grants::achievement_id))
                    .do_nothing()
                    .execute(conn)
                    .await?;
                if inserted == 0 {
                    return Ok(false);
                }
                apply_locked_delta(conn, user_id, reward, now).await?;
                Ok::<_, diesel::result::Error>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_error)
    }
}
