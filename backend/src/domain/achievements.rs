//! Achievement catalogue, grants and threshold evaluation.
//!
//! Evaluation is a per-user catalogue diff: every achievement without a
//! grant is compared against the aggregate statistic matching its kind.
//! Granting is idempotent; storage enforces one grant per
//! `(user, achievement)` pair.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::progress::{completed_module_ids, count_completed_trails};
use crate::domain::{AchievementId, Module, ModuleProgress, UserId, XpLedger, level_for_xp};

/// Title of the achievement granted on a user's first approved submission.
pub const FIRST_APPROVAL_TITLE: &str = "Primeira Aprovação";

/// Which aggregate statistic an achievement's requirement is compared to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    /// Compared against completed modules.
    Module,
    /// Compared against completed trails.
    Trail,
    /// Compared against the activity streak in days.
    Streak,
    /// Never threshold-evaluated; granted by title only.
    Special,
}

impl AchievementKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Trail => "trail",
            Self::Streak => "streak",
            Self::Special => "special",
        }
    }
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an achievement kind string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown achievement kind: {0}")]
pub struct ParseAchievementKindError(pub String);

impl FromStr for AchievementKind {
    type Err = ParseAchievementKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "module" => Ok(Self::Module),
            "trail" => Ok(Self::Trail),
            "streak" => Ok(Self::Streak),
            "special" => Ok(Self::Special),
            other => Err(ParseAchievementKindError(other.to_owned())),
        }
    }
}

/// Catalogue entry describing a milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: AchievementId,
    pub title: String,
    pub description: String,
    pub kind: AchievementKind,
    pub requirement_value: i64,
    pub xp_reward: i64,
}

/// Record of an achievement having been awarded to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementGrant {
    pub user_id: UserId,
    pub achievement_id: AchievementId,
    pub earned_at: DateTime<Utc>,
}

/// Result of a single grant attempt.
///
/// `NotGranted` covers both an existing grant and an unknown title; neither
/// is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    Granted(Achievement),
    NotGranted,
}

impl GrantOutcome {
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Aggregate statistics for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_xp: i64,
    pub level: i32,
    pub achievements_count: u32,
    pub completed_modules: u32,
    pub completed_trails: u32,
    pub streak_days: i32,
}

impl UserStats {
    /// Derive statistics from the catalogue, progress rows and ledger.
    pub fn derive(
        modules: &[Module],
        progress: &[ModuleProgress],
        ledger: Option<&XpLedger>,
        achievements_count: usize,
    ) -> Self {
        let total_xp = ledger.map_or(0, |ledger| ledger.total_xp);
        Self {
            total_xp,
            level: level_for_xp(total_xp),
            achievements_count: u32::try_from(achievements_count).unwrap_or(u32::MAX),
            completed_modules: u32::try_from(completed_module_ids(progress).len())
                .unwrap_or(u32::MAX),
            completed_trails: count_completed_trails(modules, progress),
            streak_days: ledger.map_or(0, |ledger| ledger.streak_days),
        }
    }

    /// The statistic an achievement of `kind` is compared against.
    pub fn stat_for(&self, kind: AchievementKind) -> Option<i64> {
        match kind {
            AchievementKind::Module => Some(i64::from(self.completed_modules)),
            AchievementKind::Trail => Some(i64::from(self.completed_trails)),
            AchievementKind::Streak => Some(i64::from(self.streak_days)),
            AchievementKind::Special => None,
        }
    }
}

/// Catalogue entries not yet granted whose threshold is now met.
pub fn eligible_achievements<'a>(
    catalogue: &'a [Achievement],
    granted: &HashSet<AchievementId>,
    stats: &UserStats,
) -> Vec<&'a Achievement> {
    catalogue
        .iter()
        .filter(|achievement| !granted.contains(&achievement.id))
        .filter(|achievement| {
            stats
                .stat_for(achievement.kind)
                .is_some_and(|value| value >= achievement.requirement_value)
        })
        .collect()
}

/// An achievement the user holds, with when it was earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedAchievement {
    pub achievement: Achievement,
    pub earned_at: DateTime<Utc>,
}

/// Catalogue entry annotated with the user's progress towards it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementProgress {
    pub achievement: Achievement,
    pub earned: bool,
    pub earned_at: Option<DateTime<Utc>>,
    /// Matching statistic, capped at the requirement.
    pub current: i64,
    pub requirement: i64,
}

/// Join grants onto the catalogue, newest earned first.
pub fn earned_achievements(
    catalogue: &[Achievement],
    grants: &[AchievementGrant],
) -> Vec<EarnedAchievement> {
    let by_id: HashMap<AchievementId, &Achievement> = catalogue
        .iter()
        .map(|achievement| (achievement.id, achievement))
        .collect();
    let mut earned: Vec<EarnedAchievement> = grants
        .iter()
        .filter_map(|grant| {
            by_id.get(&grant.achievement_id).map(|achievement| EarnedAchievement {
                achievement: (*achievement).clone(),
                earned_at: grant.earned_at,
            })
        })
        .collect();
    earned.sort_by(|a, b| b.earned_at.cmp(&a.earned_at));
    earned
}

/// Annotate every catalogue entry with the user's progress.
///
/// Special achievements have no statistic; they report `1/1` once earned
/// and `0/1` before.
pub fn achievement_progress(
    catalogue: &[Achievement],
    grants: &[AchievementGrant],
    stats: &UserStats,
) -> Vec<AchievementProgress> {
    let earned_at: HashMap<AchievementId, DateTime<Utc>> = grants
        .iter()
        .map(|grant| (grant.achievement_id, grant.earned_at))
        .collect();

    catalogue
        .iter()
        .map(|achievement| {
            let earned = earned_at.get(&achievement.id).copied();
            let (current, requirement) = match stats.stat_for(achievement.kind) {
                Some(value) => (
                    value.min(achievement.requirement_value),
                    achievement.requirement_value,
                ),
                None => (i64::from(earned.is_some()), 1),
            };
            AchievementProgress {
                achievement: achievement.clone(),
                earned: earned.is_some(),
                earned_at: earned,
                current,
                requirement,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "achievements_tests.rs"]
mod tests;
