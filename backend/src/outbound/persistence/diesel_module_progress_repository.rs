//! PostgreSQL-backed module progress.
//!
//! A status write ensures the row exists, locks it with `FOR UPDATE`, runs
//! the domain transition and writes the result back in one transaction. Two
//! concurrent completions of the same module therefore serialise, and only
//! the first observes the move into `completed`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{ModuleProgressRepository, ModuleProgressRepositoryError};
use crate::domain::{Module, ModuleProgress, ModuleTransition, TargetStatus, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ModuleProgressRow, ModuleProgressUpsert};
use super::pool::DbPool;
use super::schema::module_progress;

/// Diesel-backed implementation of [`ModuleProgressRepository`].
#[derive(Clone)]
pub struct DieselModuleProgressRepository {
    pool: DbPool,
}

impl DieselModuleProgressRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> ModuleProgressRepositoryError {
    map_diesel_error(
        error,
        ModuleProgressRepositoryError::query,
        ModuleProgressRepositoryError::connection,
    )
}

enum WriteFailure {
    Diesel(diesel::result::Error),
    Decode(String),
}

impl From<diesel::result::Error> for WriteFailure {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

impl From<WriteFailure> for ModuleProgressRepositoryError {
    fn from(value: WriteFailure) -> Self {
        match value {
            WriteFailure::Diesel(error) => map_error(error),
            WriteFailure::Decode(message) => Self::query(message),
        }
    }
}

async fn write_status(
    conn: &mut AsyncPgConnection,
    user_id: &UserId,
    module: &Module,
    target: TargetStatus,
    now: DateTime<Utc>,
) -> Result<ModuleTransition, WriteFailure> {
    // Seed a `not_started` row so first writes have something to lock; it is
    // overwritten before commit, so readers never see it.
    let placeholder = ModuleProgress::not_started(*user_id, module);
    diesel::insert_into(module_progress::table)
        .values(ModuleProgressUpsert::from_domain(&placeholder, now))
        .on_conflict((module_progress::user_id, module_progress::module_id))
        .do_nothing()
        .execute(conn)
        .await?;

    let locked: ModuleProgressRow = module_progress::table
        .find((*user_id.as_uuid(), *module.id.as_uuid()))
        .select(ModuleProgressRow::as_select())
        .for_update()
        .first(conn)
        .await?;
    let current =
        ModuleProgress::try_from(locked).map_err(|err| WriteFailure::Decode(err.to_string()))?;
    let transition = current.transition(module, target, now);

    diesel::update(module_progress::table.find((*user_id.as_uuid(), *module.id.as_uuid())))
        .set(ModuleProgressUpsert::from_domain(&transition.progress, now))
        .execute(conn)
        .await?;

    Ok(transition)
}

#[async_trait]
impl ModuleProgressRepository for DieselModuleProgressRepository {
    async fn record_status(
        &self,
        user_id: &UserId,
        module: &Module,
        target: TargetStatus,
        now: DateTime<Utc>,
    ) -> Result<ModuleTransition, ModuleProgressRepositoryError> {
        let mut pooled = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ModuleProgressRepositoryError::connection))?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let transition = conn
            .transaction(|conn| {
                async move { write_status(conn, user_id, module, target, now).await }
                    .scope_boxed()
            })
            .await?;
        Ok(transition)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ModuleProgress>, ModuleProgressRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ModuleProgressRepositoryError::connection))?;

        let rows: Vec<ModuleProgressRow> = module_progress::table
            .filter(module_progress::user_id.eq(*user_id.as_uuid()))
            .select(ModuleProgressRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match ModuleProgress::try_from(row) {
                Ok(progress) => Some(progress),
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "skipping unreadable progress row");
                    None
                }
            })
            .collect())
    }
}
