//! In-memory Ledger Store implementing every engine repository port.
//!
//! A single mutex guards all state, so each port call is one atomic unit of
//! work in the same way a database transaction is for the Diesel adapters:
//! a grant and its XP credit, or a decision and its debit, land together.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AchievementRepository, AchievementRepositoryError, AppliedDelta, CatalogueRepository,
    CatalogueRepositoryError, ModuleProgressRepository, ModuleProgressRepositoryError,
    NotificationSink, RewardRequestRepository, RewardRequestRepositoryError, XpLedgerRepository,
    XpLedgerRepositoryError,
};
use crate::domain::{
    Achievement, AchievementGrant, DecisionRecord, EnginePorts, Module, ModuleId, ModuleProgress,
    ModuleTransition, NewRewardRequest, RewardDecision, RewardRequest, RewardRequestId,
    RewardRequestStatus, TargetStatus, Trail, TrailId, UserId, XpLedger, level_for_xp,
};

#[derive(Debug, Default)]
struct StoreState {
    trails: Vec<Trail>,
    modules: Vec<Module>,
    progress: HashMap<(UserId, ModuleId), ModuleProgress>,
    ledgers: HashMap<UserId, XpLedger>,
    achievements: Vec<Achievement>,
    grants: Vec<AchievementGrant>,
    requests: Vec<RewardRequest>,
}

impl StoreState {
    fn apply_delta(&mut self, user_id: UserId, delta: i64, now: DateTime<Utc>) -> AppliedDelta {
        let ledger = self
            .ledgers
            .entry(user_id)
            .or_insert_with(|| XpLedger::empty(user_id, now));
        let change = ledger.apply_delta(delta, now);
        AppliedDelta {
            ledger: ledger.clone(),
            change,
        }
    }

    fn balance(&self, user_id: &UserId) -> i64 {
        self.ledgers
            .get(user_id)
            .map_or(0, |ledger| ledger.total_xp)
    }
}

/// Shared in-memory store; clone the `Arc` to hand it to several ports.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: Mutex<StoreState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn add_trail(&self, trail: Trail) {
        self.lock_state().trails.push(trail);
    }

    pub fn add_module(&self, module: Module) {
        self.lock_state().modules.push(module);
    }

    pub fn add_achievement(&self, achievement: Achievement) {
        self.lock_state().achievements.push(achievement);
    }

    /// Seed a ledger with an exact balance, bypassing activity tracking.
    pub fn set_balance(&self, user_id: UserId, total_xp: i64, now: DateTime<Utc>) {
        let ledger = XpLedger {
            total_xp,
            level: level_for_xp(total_xp),
            ..XpLedger::empty(user_id, now)
        };
        self.lock_state().ledgers.insert(user_id, ledger);
    }

    pub fn ledger(&self, user_id: &UserId) -> Option<XpLedger> {
        self.lock_state().ledgers.get(user_id).cloned()
    }

    pub fn total_xp(&self, user_id: &UserId) -> i64 {
        self.lock_state().balance(user_id)
    }

    pub fn grants_for(&self, user_id: &UserId) -> Vec<AchievementGrant> {
        self.lock_state()
            .grants
            .iter()
            .filter(|grant| grant.user_id == *user_id)
            .cloned()
            .collect()
    }

    pub fn request(&self, id: &RewardRequestId) -> Option<RewardRequest> {
        self.lock_state()
            .requests
            .iter()
            .find(|request| request.id == *id)
            .cloned()
    }

    /// Expose this store through every repository port of the engine.
    pub fn ports(self: &Arc<Self>, notifications: Arc<dyn NotificationSink>) -> EnginePorts {
        EnginePorts {
            catalogue: self.clone(),
            progress: self.clone(),
            ledger: self.clone(),
            achievements: self.clone(),
            rewards: self.clone(),
            notifications,
        }
    }
}

fn newest_first(mut requests: Vec<RewardRequest>) -> Vec<RewardRequest> {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    requests
}

#[async_trait]
impl CatalogueRepository for InMemoryLedgerStore {
    async fn list_trails(&self) -> Result<Vec<Trail>, CatalogueRepositoryError> {
        let mut trails = self.lock_state().trails.clone();
        trails.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(trails)
    }

    async fn find_trail(
        &self,
        trail_id: &TrailId,
    ) -> Result<Option<Trail>, CatalogueRepositoryError> {
        Ok(self
            .lock_state()
            .trails
            .iter()
            .find(|trail| trail.id == *trail_id)
            .cloned())
    }

    async fn list_modules(&self) -> Result<Vec<Module>, CatalogueRepositoryError> {
        let mut modules = self.lock_state().modules.clone();
        modules.sort_by_key(|module| (module.trail_id, module.order_index));
        Ok(modules)
    }

    async fn list_modules_for_trail(
        &self,
        trail_id: &TrailId,
    ) -> Result<Vec<Module>, CatalogueRepositoryError> {
        let mut modules: Vec<Module> = self
            .lock_state()
            .modules
            .iter()
            .filter(|module| module.trail_id == *trail_id)
            .cloned()
            .collect();
        modules.sort_by_key(|module| module.order_index);
        Ok(modules)
    }

    async fn find_module(
        &self,
        module_id: &ModuleId,
    ) -> Result<Option<Module>, CatalogueRepositoryError> {
        Ok(self
            .lock_state()
            .modules
            .iter()
            .find(|module| module.id == *module_id)
            .cloned())
    }
}

#[async_trait]
impl ModuleProgressRepository for InMemoryLedgerStore {
    async fn record_status(
        &self,
        user_id: &UserId,
        module: &Module,
        target: TargetStatus,
        now: DateTime<Utc>,
    ) -> Result<ModuleTransition, ModuleProgressRepositoryError> {
        let mut state = self.lock_state();
        let key = (*user_id, module.id);
        let row = state
            .progress
            .get(&key)
            .cloned()
            .unwrap_or_else(|| ModuleProgress::not_started(*user_id, module));
        let transition = row.transition(module, target, now);
        state.progress.insert(key, transition.progress.clone());
        Ok(transition)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ModuleProgress>, ModuleProgressRepositoryError> {
        Ok(self
            .lock_state()
            .progress
            .values()
            .filter(|row| row.user_id == *user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl XpLedgerRepository for InMemoryLedgerStore {
    async fn find(&self, user_id: &UserId) -> Result<Option<XpLedger>, XpLedgerRepositoryError> {
        Ok(self.ledger(user_id))
    }

    async fn apply_delta(
        &self,
        user_id: &UserId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<AppliedDelta, XpLedgerRepositoryError> {
        Ok(self.lock_state().apply_delta(*user_id, delta, now))
    }
}

#[async_trait]
impl AchievementRepository for InMemoryLedgerStore {
    async fn list_catalogue(&self) -> Result<Vec<Achievement>, AchievementRepositoryError> {
        let mut catalogue = self.lock_state().achievements.clone();
        catalogue.sort_by(|a, b| {
            (a.kind.as_str(), a.requirement_value, &a.title).cmp(&(
                b.kind.as_str(),
                b.requirement_value,
                &b.title,
            ))
        });
        Ok(catalogue)
    }

    async fn find_by_title(
        &self,
        title: &str,
    ) -> Result<Option<Achievement>, AchievementRepositoryError> {
        Ok(self
            .lock_state()
            .achievements
            .iter()
            .find(|achievement| achievement.title == title)
            .cloned())
    }

    async fn list_grants(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AchievementGrant>, AchievementRepositoryError> {
        Ok(self.grants_for(user_id))
    }

    async fn grant(
        &self,
        user_id: &UserId,
        achievement: &Achievement,
        now: DateTime<Utc>,
    ) -> Result<bool, AchievementRepositoryError> {
        let mut state = self.lock_state();
        let exists = state
            .grants
            .iter()
            .any(|grant| grant.user_id == *user_id && grant.achievement_id == achievement.id);
        if exists {
            return Ok(false);
        }
        state.grants.push(AchievementGrant {
            user_id: *user_id,
            achievement_id: achievement.id,
            earned_at: now,
        });
        state.apply_delta(*user_id, achievement.xp_reward, now);
        Ok(true)
    }
}

#[async_trait]
impl RewardRequestRepository for InMemoryLedgerStore {
    async fn create_if_affordable(
        &self,
        request: NewRewardRequest,
    ) -> Result<RewardRequest, RewardRequestRepositoryError> {
        let mut state = self.lock_state();
        let required = request.points_cost();
        let available = state.balance(&request.student_id);
        if available < required {
            return Err(RewardRequestRepositoryError::insufficient_points(
                required, available,
            ));
        }
        let created = request.into_request();
        state.requests.push(created.clone());
        Ok(created)
    }

    async fn find(
        &self,
        id: &RewardRequestId,
    ) -> Result<Option<RewardRequest>, RewardRequestRepositoryError> {
        Ok(self.request(id))
    }

    async fn list_for_student(
        &self,
        student_id: &UserId,
    ) -> Result<Vec<RewardRequest>, RewardRequestRepositoryError> {
        let requests = self
            .lock_state()
            .requests
            .iter()
            .filter(|request| request.student_id == *student_id)
            .cloned()
            .collect();
        Ok(newest_first(requests))
    }

    async fn list(
        &self,
        status: Option<RewardRequestStatus>,
    ) -> Result<Vec<RewardRequest>, RewardRequestRepositoryError> {
        let requests = self
            .lock_state()
            .requests
            .iter()
            .filter(|request| status.is_none_or(|status| request.status == status))
            .cloned()
            .collect();
        Ok(newest_first(requests))
    }

    async fn decide(
        &self,
        decision: &DecisionRecord,
    ) -> Result<RewardRequest, RewardRequestRepositoryError> {
        let mut state = self.lock_state();
        let index = state
            .requests
            .iter()
            .position(|request| request.id == decision.request_id)
            .ok_or_else(|| RewardRequestRepositoryError::not_found(decision.request_id))?;

        let mut request = state.requests[index].clone();
        if request.status != RewardRequestStatus::Pending {
            return Err(RewardRequestRepositoryError::already_decided(request.status));
        }
        if decision.decision == RewardDecision::Approve {
            let required = request.points_cost();
            let available = state.balance(&request.student_id);
            if available < required {
                return Err(RewardRequestRepositoryError::insufficient_points(
                    required, available,
                ));
            }
        }

        request
            .apply_decision(decision)
            .map_err(|err| RewardRequestRepositoryError::already_decided(err.status))?;
        if request.status == RewardRequestStatus::Approved {
            state.apply_delta(request.student_id, -request.points_cost(), decision.decided_at);
        }
        state.requests[index] = request.clone();
        Ok(request)
    }
}
