//! PostgreSQL-backed curriculum catalogue.
//!
//! The engine only reads trails and modules; authoring them is owned by
//! another service writing to the same tables.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CatalogueRepository, CatalogueRepositoryError};
use crate::domain::{Module, ModuleId, Trail, TrailId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ModuleRow, TrailRow};
use super::pool::DbPool;
use super::schema::{modules, trails};

/// Diesel-backed implementation of [`CatalogueRepository`].
#[derive(Clone)]
pub struct DieselCatalogueRepository {
    pool: DbPool,
}

impl DieselCatalogueRepository {
    /// Create a repository over the given pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use progression::outbound::persistence::{DbPool, DieselCatalogueRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/progression")).await?;
    /// let repository = DieselCatalogueRepository::new(pool);
    /// # let _ = repository;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> CatalogueRepositoryError {
    map_diesel_error(
        error,
        CatalogueRepositoryError::query,
        CatalogueRepositoryError::connection,
    )
}

#[async_trait]
impl CatalogueRepository for DieselCatalogueRepository {
    async fn list_trails(&self) -> Result<Vec<Trail>, CatalogueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CatalogueRepositoryError::connection))?;

        let rows: Vec<TrailRow> = trails::table
            .select(TrailRow::as_select())
            .order_by((trails::title, trails::id))
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(rows.into_iter().map(Trail::from).collect())
    }

    async fn find_trail(
        &self,
        trail_id: &TrailId,
    ) -> Result<Option<Trail>, CatalogueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CatalogueRepositoryError::connection))?;

        let row: Option<TrailRow> = trails::table
            .find(*trail_id.as_uuid())
            .select(TrailRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        Ok(row.map(Trail::from))
    }

    async fn list_modules(&self) -> Result<Vec<Module>, CatalogueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CatalogueRepositoryError::connection))?;

        let rows: Vec<ModuleRow> = modules::table
            .select(ModuleRow::as_select())
            .order_by((modules::trail_id, modules::order_index))
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(rows.into_iter().map(Module::from).collect())
    }

    async fn list_modules_for_trail(
        &self,
        trail_id: &TrailId,
    ) -> Result<Vec<Module>, CatalogueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CatalogueRepositoryError::connection))?;

        let rows: Vec<ModuleRow> = modules::table
            .filter(modules::trail_id.eq(*trail_id.as_uuid()))
            .select(ModuleRow::as_select())
            .order_by(modules::order_index)
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(rows.into_iter().map(Module::from).collect())
    }

    async fn find_module(
        &self,
        module_id: &ModuleId,
    ) -> Result<Option<Module>, CatalogueRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CatalogueRepositoryError::connection))?;

        let row: Option<ModuleRow> = modules::table
            .find(*module_id.as_uuid())
            .select(ModuleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        Ok(row.map(Module::from))
    }
}
