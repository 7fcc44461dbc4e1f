//! Domain primitives, rules, ports and services of the progression engine.
//!
//! Entities and pure rules live in their own modules; services implement the
//! driving ports on top of the driven ports in [`ports`]. Nothing in here
//! depends on HTTP or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Progress, XP, achievement and reward entities with their rules.
//! - [`EngineServices`]: the wired services behind the driving ports.

pub mod ports;

mod achievement_service;
mod achievements;
mod actor;
mod catalogue;
mod engine;
mod error;
mod ids;
mod notifications;
mod progress;
mod progress_service;
mod reward_service;
mod rewards;
mod trace_id;
mod xp;
mod xp_ledger_service;

pub use self::achievement_service::AchievementService;
pub use self::achievements::{
    Achievement, AchievementGrant, AchievementKind, AchievementProgress, EarnedAchievement,
    FIRST_APPROVAL_TITLE, GrantOutcome, ParseAchievementKindError, UserStats,
    achievement_progress, earned_achievements, eligible_achievements,
};
pub use self::actor::{Actor, ParseRoleError, Role};
pub use self::catalogue::{Module, Trail};
pub use self::engine::{EnginePorts, EngineServices};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::ids::{AchievementId, IdValidationError, ModuleId, RewardRequestId, TrailId, UserId};
pub use self::notifications::{NotificationEvent, NotificationKind};
pub use self::progress::{
    ModuleProgress, ModuleStatus, ModuleTransition, ModuleView, ParseModuleStatusError,
    TargetStatus, TrailProgress, completed_module_ids, count_completed_trails, module_views,
    trail_progress,
};
pub use self::progress_service::ProgressService;
pub use self::reward_service::RewardService;
pub use self::rewards::{
    AlreadyDecided, DecisionRecord, MAX_NOTE_CHARS, NewRewardRequest, ParseRewardDecisionError,
    ParseRewardRequestStatusError, ParseRewardTypeError, RewardDecision, RewardRequest,
    RewardRequestStatus, RewardType, RewardTypeInfo, normalise_note, reward_catalogue,
};
pub use self::trace_id::TraceId;
pub use self::xp::{XP_PER_LEVEL, XpChange, XpLedger, level_for_xp};
pub use self::xp_ledger_service::XpLedgerService;

/// Convenient result alias for driving-port operations.
///
/// # Examples
/// ```
/// use progression::domain::{DomainResult, Error};
///
/// fn guard() -> DomainResult<()> {
///     Err(Error::unauthorized("professors only"))
/// }
/// assert!(guard().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
