//! Module progress rows and the read models derived from them.
//!
//! A [`ModuleProgress`] row exists once a user first touches a module; the
//! absence of a row means `not_started`. Lock state and trail progress are
//! never stored. They are recomputed from the rows on every read so they
//! cannot drift from the completion records.
//!
//! ## Invariants
//! - `xp_earned` is non-zero if and only if `status` is `completed`.
//! - `completed_at` is set if and only if `status` is `completed`.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Module, ModuleId, Trail, TrailId, UserId};

/// Completion state of a module for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ModuleStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown module status: {0}")]
pub struct ParseModuleStatusError(pub String);

impl FromStr for ModuleStatus {
    type Err = ParseModuleStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(ParseModuleStatusError(other.to_owned())),
        }
    }
}

/// Status a caller may write explicitly.
///
/// `not_started` is deliberately absent: it is represented by the absence of
/// a progress row and can never be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    InProgress,
    Completed,
}

impl From<TargetStatus> for ModuleStatus {
    fn from(value: TargetStatus) -> Self {
        match value {
            TargetStatus::InProgress => Self::InProgress,
            TargetStatus::Completed => Self::Completed,
        }
    }
}

impl FromStr for TargetStatus {
    type Err = ParseModuleStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(ParseModuleStatusError(other.to_owned())),
        }
    }
}

/// Persisted progress of one user on one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub user_id: UserId,
    pub module_id: ModuleId,
    /// Denormalised from the module for per-trail aggregation.
    pub trail_id: TrailId,
    pub status: ModuleStatus,
    pub xp_earned: i64,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Outcome of writing a status: the new row plus the XP it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTransition {
    pub previous: ModuleStatus,
    pub progress: ModuleProgress,
    /// Signed XP change to feed into the ledger.
    pub xp_delta: i64,
}

impl ModuleTransition {
    /// Whether the write moved the module into `completed`, which is what
    /// triggers evaluation.
    pub fn is_completion(&self) -> bool {
        self.previous != ModuleStatus::Completed
            && self.progress.status == ModuleStatus::Completed
    }
}

impl ModuleProgress {
    /// Row state for a user who has never touched `module`.
    pub fn not_started(user_id: UserId, module: &Module) -> Self {
        Self {
            user_id,
            module_id: module.id,
            trail_id: module.trail_id,
            status: ModuleStatus::NotStarted,
            xp_earned: 0,
            completed_at: None,
        }
    }

    /// Apply a status write and compute the resulting XP delta.
    ///
    /// - into `completed` from any other state: `+xp_reward`;
    /// - out of `completed`: minus the previously earned amount;
    /// - anything else: zero.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use progression::domain::{
    ///     Module, ModuleId, ModuleProgress, TargetStatus, TrailId, UserId,
    /// };
    ///
    /// let module = Module {
    ///     id: ModuleId::random(),
    ///     trail_id: TrailId::random(),
    ///     title: "Intro".into(),
    ///     order_index: 1,
    ///     xp_reward: 50,
    /// };
    /// let row = ModuleProgress::not_started(UserId::random(), &module);
    /// let done = row.transition(&module, TargetStatus::Completed, Utc::now());
    /// assert_eq!(done.xp_delta, 50);
    /// let undone = done.progress.transition(&module, TargetStatus::InProgress, Utc::now());
    /// assert_eq!(undone.xp_delta, -50);
    /// ```
    #[must_use]
    pub fn transition(
        self,
        module: &Module,
        target: TargetStatus,
        now: DateTime<Utc>,
    ) -> ModuleTransition {
        let previous = self.status;
        let next: ModuleStatus = target.into();
        let was_completed = previous == ModuleStatus::Completed;
        let is_completed = next == ModuleStatus::Completed;

        let (xp_delta, xp_earned, completed_at) = match (was_completed, is_completed) {
            (false, true) => (module.xp_reward, module.xp_reward, Some(now)),
            (true, false) => (-self.xp_earned, 0, None),
            _ => (0, self.xp_earned, self.completed_at),
        };

        ModuleTransition {
            previous,
            progress: Self {
                status: next,
                xp_earned,
                completed_at,
                ..self
            },
            xp_delta,
        }
    }
}

/// A module together with the caller's derived view of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleView {
    pub module: Module,
    pub status: ModuleStatus,
    pub xp_earned: i64,
    pub completed_at: Option<DateTime<Utc>>,
    /// Derived on read; never persisted.
    pub unlocked: bool,
}

/// Build the ordered module list for one trail with lock state.
///
/// A module is unlocked when it is the first by `order_index` or when the
/// module immediately before it is completed.
pub fn module_views(mut modules: Vec<Module>, progress: &[ModuleProgress]) -> Vec<ModuleView> {
    modules.sort_by_key(|module| module.order_index);
    let by_module: HashMap<ModuleId, &ModuleProgress> =
        progress.iter().map(|row| (row.module_id, row)).collect();

    let mut previous_completed = true;
    modules
        .into_iter()
        .map(|module| {
            let row = by_module.get(&module.id);
            let status = row.map_or(ModuleStatus::NotStarted, |row| row.status);
            let view = ModuleView {
                unlocked: previous_completed,
                status,
                xp_earned: row.map_or(0, |row| row.xp_earned),
                completed_at: row.and_then(|row| row.completed_at),
                module,
            };
            previous_completed = status == ModuleStatus::Completed;
            view
        })
        .collect()
}

/// Derived completion summary of a trail for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailProgress {
    pub trail: Trail,
    pub total_modules: u32,
    pub completed_modules: u32,
    /// Whole percentage, rounded half up; zero for an empty trail.
    pub percentage: u8,
}

impl TrailProgress {
    /// A trail counts as completed only when it has modules and all are done.
    pub const fn is_completed(&self) -> bool {
        self.total_modules > 0 && self.completed_modules == self.total_modules
    }
}

fn percentage(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (u64::from(completed) * 100 + u64::from(total) / 2) / u64::from(total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Identifiers of the modules a user has completed.
pub fn completed_module_ids(progress: &[ModuleProgress]) -> HashSet<ModuleId> {
    progress
        .iter()
        .filter(|row| row.status == ModuleStatus::Completed)
        .map(|row| row.module_id)
        .collect()
}

/// Aggregate completion counts per trail.
pub fn trail_progress(
    trails: Vec<Trail>,
    modules: &[Module],
    progress: &[ModuleProgress],
) -> Vec<TrailProgress> {
    let completed = completed_module_ids(progress);
    let mut counts: HashMap<TrailId, (u32, u32)> = HashMap::new();
    for module in modules {
        let entry = counts.entry(module.trail_id).or_default();
        entry.0 += 1;
        if completed.contains(&module.id) {
            entry.1 += 1;
        }
    }

    trails
        .into_iter()
        .map(|trail| {
            let (total_modules, completed_modules) =
                counts.get(&trail.id).copied().unwrap_or_default();
            TrailProgress {
                trail,
                total_modules,
                completed_modules,
                percentage: percentage(completed_modules, total_modules),
            }
        })
        .collect()
}

/// Number of trails in which every module is completed.
pub fn count_completed_trails(modules: &[Module], progress: &[ModuleProgress]) -> u32 {
    let completed = completed_module_ids(progress);
    let mut trails: HashMap<TrailId, bool> = HashMap::new();
    for module in modules {
        let done = completed.contains(&module.id);
        trails
            .entry(module.trail_id)
            .and_modify(|all| *all &= done)
            .or_insert(done);
    }
    let count = trails.values().filter(|all| **all).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
