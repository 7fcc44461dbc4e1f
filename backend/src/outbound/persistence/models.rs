//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Enumerations are stored as their
//! snake_case strings, so decoding a row can fail on a value this build does
//! not recognise; that surfaces as [`InvalidColumn`].

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Achievement, AchievementGrant, AchievementId, AchievementKind, Module, ModuleId,
    ModuleProgress, ModuleStatus, RewardRequest, RewardRequestId, RewardRequestStatus,
    RewardType, Trail, TrailId, UserId, XpLedger,
};

use super::schema::{
    achievement_grants, achievements, module_progress, modules, reward_requests, trails,
    xp_ledgers,
};

/// A stored enumeration value this build does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised {column} value {value:?}")]
pub(crate) struct InvalidColumn {
    pub column: &'static str,
    pub value: String,
}

fn parse_column<T: std::str::FromStr>(
    column: &'static str,
    value: String,
) -> Result<T, InvalidColumn> {
    value
        .parse()
        .map_err(|_| InvalidColumn { column, value })
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = trails)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TrailRow {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub total_xp: i64,
}

impl From<TrailRow> for Trail {
    fn from(row: TrailRow) -> Self {
        Self {
            id: TrailId::from_uuid(row.id),
            title: row.title,
            category: row.category,
            total_xp: row.total_xp,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = modules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ModuleRow {
    pub id: Uuid,
    pub trail_id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub xp_reward: i64,
}

impl From<ModuleRow> for Module {
    fn from(row: ModuleRow) -> Self {
        Self {
            id: ModuleId::from_uuid(row.id),
            trail_id: TrailId::from_uuid(row.trail_id),
            title: row.title,
            order_index: row.order_index,
            xp_reward: row.xp_reward,
        }
    }
}

// ---------------------------------------------------------------------------
// Module progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = module_progress)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ModuleProgressRow {
    pub user_id: Uuid,
    pub module_id: Uuid,
    pub trail_id: Uuid,
    pub status: String,
    pub xp_earned: i64,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<ModuleProgressRow> for ModuleProgress {
    type Error = InvalidColumn;

    fn try_from(row: ModuleProgressRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::from_uuid(row.user_id),
            module_id: ModuleId::from_uuid(row.module_id),
            trail_id: TrailId::from_uuid(row.trail_id),
            status: parse_column::<ModuleStatus>("module_progress.status", row.status)?,
            xp_earned: row.xp_earned,
            completed_at: row.completed_at,
        })
    }
}

/// Upsert payload for a progress row.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = module_progress, primary_key(user_id, module_id))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ModuleProgressUpsert<'a> {
    pub user_id: Uuid,
    pub module_id: Uuid,
    pub trail_id: Uuid,
    pub status: &'a str,
    pub xp_earned: i64,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> ModuleProgressUpsert<'a> {
    pub fn from_domain(progress: &ModuleProgress, now: DateTime<Utc>) -> Self {
        Self {
            user_id: *progress.user_id.as_uuid(),
            module_id: *progress.module_id.as_uuid(),
            trail_id: *progress.trail_id.as_uuid(),
            status: progress.status.as_str(),
            xp_earned: progress.xp_earned,
            completed_at: progress.completed_at,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// XP ledger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = xp_ledgers, primary_key(user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct XpLedgerRow {
    pub user_id: Uuid,
    pub total_xp: i64,
    pub level: i32,
    pub streak_days: i32,
    pub last_activity_on: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl From<XpLedgerRow> for XpLedger {
    fn from(row: XpLedgerRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            total_xp: row.total_xp,
            level: row.level,
            streak_days: row.streak_days,
            last_activity_on: row.last_activity_on,
            updated_at: row.updated_at,
        }
    }
}

impl From<&XpLedger> for XpLedgerRow {
    fn from(ledger: &XpLedger) -> Self {
        Self {
            user_id: *ledger.user_id.as_uuid(),
            total_xp: ledger.total_xp,
            level: ledger.level,
            streak_days: ledger.streak_days,
            last_activity_on: ledger.last_activity_on,
            updated_at: ledger.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = achievements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AchievementRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub kind: String,
    pub requirement_value: i64,
    pub xp_reward: i64,
}

impl TryFrom<AchievementRow> for Achievement {
    type Error = InvalidColumn;

    fn try_from(row: AchievementRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AchievementId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            kind: parse_column::<AchievementKind>("achievements.kind", row.kind)?,
            requirement_value: row.requirement_value,
            xp_reward: row.xp_reward,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = achievement_grants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AchievementGrantRow {
    pub user_id: Uuid,
    pub achievement_id: Uuid,
    pub earned_at: DateTime<Utc>,
}

impl From<AchievementGrantRow> for AchievementGrant {
    fn from(row: AchievementGrantRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            achievement_id: AchievementId::from_uuid(row.achievement_id),
            earned_at: row.earned_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Reward requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reward_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RewardRequestRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub reward_type: String,
    pub message: Option<String>,
    pub status: String,
    pub professor_id: Option<Uuid>,
    pub professor_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RewardRequestRow> for RewardRequest {
    type Error = InvalidColumn;

    fn try_from(row: RewardRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RewardRequestId::from_uuid(row.id),
            student_id: UserId::from_uuid(row.student_id),
            reward_type: parse_column::<RewardType>("reward_requests.reward_type", row.reward_type)?,
            message: row.message,
            status: parse_column::<RewardRequestStatus>("reward_requests.status", row.status)?,
            professor_id: row.professor_id.map(UserId::from_uuid),
            professor_response: row.professor_response,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reward_requests)]
pub(crate) struct NewRewardRequestRow<'a> {
    pub id: Uuid,
    pub student_id: Uuid,
    pub reward_type: &'a str,
    pub message: Option<&'a str>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewRewardRequestRow<'a> {
    pub fn from_domain(request: &'a RewardRequest) -> Self {
        Self {
            id: *request.id.as_uuid(),
            student_id: *request.student_id.as_uuid(),
            reward_type: request.reward_type.as_str(),
            message: request.message.as_deref(),
            status: request.status.as_str(),
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// Columns a decision changes.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = reward_requests)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RewardDecisionUpdate<'a> {
    pub status: &'a str,
    pub professor_id: Option<Uuid>,
    pub professor_response: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> RewardDecisionUpdate<'a> {
    pub fn from_domain(request: &'a RewardRequest) -> Self {
        Self {
            status: request.status.as_str(),
            professor_id: request.professor_id.map(|id| *id.as_uuid()),
            professor_response: request.professor_response.as_deref(),
            updated_at: request.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn request_row(status: &str) -> RewardRequestRow {
        RewardRequestRow {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            reward_type: "bonus_activity".to_owned(),
            message: None,
            status: status.to_owned(),
            professor_id: None,
            professor_response: None,
            created_at: Utc.timestamp_opt(0, 0).single().expect("epoch"),
            updated_at: Utc.timestamp_opt(0, 0).single().expect("epoch"),
        }
    }

    #[rstest]
    fn known_statuses_decode() {
        let request = RewardRequest::try_from(request_row("approved")).expect("decodes");
        assert_eq!(request.status, RewardRequestStatus::Approved);
        assert_eq!(request.reward_type, RewardType::BonusActivity);
    }

    #[rstest]
    fn unknown_statuses_name_the_column() {
        let err = RewardRequest::try_from(request_row("cancelled")).expect_err("unknown");
        assert_eq!(err.column, "reward_requests.status");
        assert!(err.to_string().contains("cancelled"));
    }

    #[rstest]
    fn ledger_rows_round_trip_through_the_domain() {
        let ledger = XpLedger::empty(UserId::random(), Utc::now());
        let row = XpLedgerRow::from(&ledger);
        assert_eq!(XpLedger::from(row), ledger);
    }
}
