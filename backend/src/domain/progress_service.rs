//! Progress tracker implementing the progress driving ports.
//!
//! A status write runs three steps in order, each committed before the
//! next starts: the progress row, the XP delta, then achievement
//! re-evaluation. Evaluation follows every move into `completed` and is
//! best-effort: a failure is logged and the committed write still stands.
//! Undoing a completion never retracts achievements.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    AchievementCommand, CatalogueRepository, ModuleProgressRepository, NotificationSink,
    ProgressCommand, ProgressQuery, SetModuleStatusRequest, SetModuleStatusResponse,
};
use crate::domain::{
    EnginePorts, Error, ModuleView, NotificationEvent, TrailId, TrailProgress, UserId,
    XpLedgerService, module_views, trail_progress,
};

#[derive(Clone)]
pub struct ProgressService {
    catalogue_repo: Arc<dyn CatalogueRepository>,
    progress_repo: Arc<dyn ModuleProgressRepository>,
    xp: XpLedgerService,
    evaluator: Arc<dyn AchievementCommand>,
    notifications: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl ProgressService {
    pub fn new(
        ports: &EnginePorts,
        xp: XpLedgerService,
        evaluator: Arc<dyn AchievementCommand>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalogue_repo: Arc::clone(&ports.catalogue),
            progress_repo: Arc::clone(&ports.progress),
            xp,
            evaluator,
            notifications: Arc::clone(&ports.notifications),
            clock,
        }
    }
}

#[async_trait]
impl ProgressCommand for ProgressService {
    async fn set_module_status(
        &self,
        request: SetModuleStatusRequest,
    ) -> Result<SetModuleStatusResponse, Error> {
        let user_id = request.actor.user_id;
        let module = self
            .catalogue_repo
            .find_module(&request.module_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("module {} not found", request.module_id)))?;

        let transition = self
            .progress_repo
            .record_status(&user_id, &module, request.status, self.clock.utc())
            .await?;
        info!(
            user_id = %user_id,
            module_id = %module.id,
            from = %transition.previous,
            to = %transition.progress.status,
            xp_delta = transition.xp_delta,
            "module status recorded"
        );

        let mut total_xp = None;
        if transition.xp_delta != 0 {
            let applied = self.xp.apply_delta(&user_id, transition.xp_delta).await?;
            total_xp = Some(applied.ledger.total_xp);
        }

        let mut granted = Vec::new();
        if transition.is_completion() {
            self.notifications
                .emit(NotificationEvent::module_completed(user_id, &module));
            granted = match self.evaluator.reevaluate(&user_id).await {
                Ok(granted) => granted,
                Err(err) => {
                    warn!(
                        user_id = %user_id,
                        module_id = %module.id,
                        code = ?err.code(),
                        error = %err.message(),
                        "achievement evaluation failed after the status committed"
                    );
                    Vec::new()
                }
            };
        }

        // Achievement rewards move the total after the module delta landed.
        let total_xp = match total_xp {
            Some(total) if granted.is_empty() => total,
            _ => self
                .xp
                .current(&user_id)
                .await?
                .map_or(0, |ledger| ledger.total_xp),
        };

        Ok(SetModuleStatusResponse::new(
            transition.progress,
            transition.previous,
            transition.xp_delta,
            total_xp,
            granted,
        ))
    }
}

#[async_trait]
impl ProgressQuery for ProgressService {
    async fn list_trails(&self, user_id: &UserId) -> Result<Vec<TrailProgress>, Error> {
        let trails = self.catalogue_repo.list_trails().await?;
        let modules = self.catalogue_repo.list_modules().await?;
        let progress = self.progress_repo.list_for_user(user_id).await?;
        Ok(trail_progress(trails, &modules, &progress))
    }

    async fn list_modules(
        &self,
        user_id: &UserId,
        trail_id: &TrailId,
    ) -> Result<Vec<ModuleView>, Error> {
        if self.catalogue_repo.find_trail(trail_id).await?.is_none() {
            return Err(Error::not_found(format!("trail {trail_id} not found")));
        }
        let modules = self.catalogue_repo.list_modules_for_trail(trail_id).await?;
        let progress = self.progress_repo.list_for_user(user_id).await?;
        Ok(module_views(modules, &progress))
    }
}

#[cfg(test)]
#[path = "progress_service_tests.rs"]
mod tests;
