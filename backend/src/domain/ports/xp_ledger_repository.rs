//! Port for the per-user XP ledger row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{UserId, XpChange, XpLedger};

use super::define_port_error;

define_port_error! {
    /// Errors raised by XP ledger repository adapters.
    pub enum XpLedgerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable,
            "xp ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError,
            "xp ledger query failed: {message}",
    }
}

/// Ledger row after a delta was applied, with the before/after snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDelta {
    pub ledger: XpLedger,
    pub change: XpChange,
}

/// Port for reading and mutating XP ledgers.
///
/// Implementations must run [`XpLedger::apply_delta`] against an
/// exclusively locked row so concurrent deltas for one user never lose an
/// update.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait XpLedgerRepository: Send + Sync {
    /// The user's ledger, or `None` before any XP-affecting event.
    async fn find(&self, user_id: &UserId) -> Result<Option<XpLedger>, XpLedgerRepositoryError>;

    /// Lazily create the ledger row and apply a signed delta to it.
    async fn apply_delta(
        &self,
        user_id: &UserId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<AppliedDelta, XpLedgerRepositoryError>;
}

/// Fixture implementation that applies deltas to a fresh ledger.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureXpLedgerRepository;

#[async_trait]
impl XpLedgerRepository for FixtureXpLedgerRepository {
    async fn find(&self, _user_id: &UserId) -> Result<Option<XpLedger>, XpLedgerRepositoryError> {
        Ok(None)
    }

    async fn apply_delta(
        &self,
        user_id: &UserId,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<AppliedDelta, XpLedgerRepositoryError> {
        let mut ledger = XpLedger::empty(*user_id, now);
        let change = ledger.apply_delta(delta, now);
        Ok(AppliedDelta { ledger, change })
    }
}
