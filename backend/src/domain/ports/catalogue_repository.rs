//! Read-side port for the curriculum catalogue.
//!
//! Trails and modules are authored outside the engine; this port only reads
//! them. Listings are deterministically ordered: trails by title, modules by
//! trail then `order_index`.

use async_trait::async_trait;

use crate::domain::{Module, ModuleId, Trail, TrailId};

use super::define_port_error;

define_port_error! {
    /// Errors raised when reading the curriculum catalogue.
    pub enum CatalogueRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable,
            "catalogue read connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => InternalError,
            "catalogue read query failed: {message}",
    }
}

/// Port for reading trails and modules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// Every trail in the catalogue.
    async fn list_trails(&self) -> Result<Vec<Trail>, CatalogueRepositoryError>;

    async fn find_trail(&self, trail_id: &TrailId)
    -> Result<Option<Trail>, CatalogueRepositoryError>;

    /// Every module across all trails; used for completed-trail aggregation.
    async fn list_modules(&self) -> Result<Vec<Module>, CatalogueRepositoryError>;

    async fn list_modules_for_trail(
        &self,
        trail_id: &TrailId,
    ) -> Result<Vec<Module>, CatalogueRepositoryError>;

    async fn find_module(
        &self,
        module_id: &ModuleId,
    ) -> Result<Option<Module>, CatalogueRepositoryError>;
}

/// Fixture implementation for tests that do not exercise catalogue reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogueRepository;

#[async_trait]
impl CatalogueRepository for FixtureCatalogueRepository {
    async fn list_trails(&self) -> Result<Vec<Trail>, CatalogueRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_trail(
        &self,
        _trail_id: &TrailId,
    ) -> Result<Option<Trail>, CatalogueRepositoryError> {
        Ok(None)
    }

    async fn list_modules(&self) -> Result<Vec<Module>, CatalogueRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_modules_for_trail(
        &self,
        _trail_id: &TrailId,
    ) -> Result<Vec<Module>, CatalogueRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_module(
        &self,
        _module_id: &ModuleId,
    ) -> Result<Option<Module>, CatalogueRepositoryError> {
        Ok(None)
    }
}
