//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the notification sink) are implemented by
//! outbound adapters. Driving ports (commands and queries) are implemented
//! by the domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod achievement_command;
mod achievement_query;
mod achievement_repository;
mod catalogue_repository;
mod module_progress_repository;
mod notification_sink;
mod progress_command;
mod progress_query;
mod reward_command;
mod reward_query;
mod reward_request_repository;
mod xp_ledger_repository;

#[cfg(test)]
pub use achievement_command::MockAchievementCommand;
pub use achievement_command::{AchievementCommand, FixtureAchievementCommand};
#[cfg(test)]
pub use achievement_query::MockAchievementQuery;
pub use achievement_query::{AchievementQuery, FixtureAchievementQuery};
#[cfg(test)]
pub use achievement_repository::MockAchievementRepository;
pub use achievement_repository::{
    AchievementRepository, AchievementRepositoryError, FixtureAchievementRepository,
};
#[cfg(test)]
pub use catalogue_repository::MockCatalogueRepository;
pub use catalogue_repository::{
    CatalogueRepository, CatalogueRepositoryError, FixtureCatalogueRepository,
};
#[cfg(test)]
pub use module_progress_repository::MockModuleProgressRepository;
pub use module_progress_repository::{
    FixtureModuleProgressRepository, ModuleProgressRepository, ModuleProgressRepositoryError,
};
#[cfg(test)]
pub use notification_sink::MockNotificationSink;
pub use notification_sink::{FixtureNotificationSink, NotificationSink};
#[cfg(test)]
pub use progress_command::MockProgressCommand;
pub use progress_command::{
    FixtureProgressCommand, ProgressCommand, SetModuleStatusRequest, SetModuleStatusResponse,
};
#[cfg(test)]
pub use progress_query::MockProgressQuery;
pub use progress_query::{FixtureProgressQuery, ProgressQuery};
#[cfg(test)]
pub use reward_command::MockRewardCommand;
pub use reward_command::{
    CreateRewardRequest, DecideRewardRequest, FixtureRewardCommand, RewardCommand,
};
#[cfg(test)]
pub use reward_query::MockRewardQuery;
pub use reward_query::{FixtureRewardQuery, RewardQuery};
#[cfg(test)]
pub use reward_request_repository::MockRewardRequestRepository;
pub use reward_request_repository::{
    FixtureRewardRequestRepository, RewardRequestRepository, RewardRequestRepositoryError,
};
#[cfg(test)]
pub use xp_ledger_repository::MockXpLedgerRepository;
pub use xp_ledger_repository::{
    AppliedDelta, FixtureXpLedgerRepository, XpLedgerRepository, XpLedgerRepositoryError,
};
