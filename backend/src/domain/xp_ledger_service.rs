//! XP ledger service: the single entry point for XP mutations.
//!
//! Progress writes route their deltas through [`XpLedgerService`].
//! Achievement rewards and reward debits are applied by their repositories
//! inside the same transaction as the grant or decision, using the same
//! [`XpLedger::apply_delta`](crate::domain::XpLedger::apply_delta) rule.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{AppliedDelta, XpLedgerRepository};
use crate::domain::{Error, UserId, XpLedger};

#[derive(Clone)]
pub struct XpLedgerService {
    ledger_repo: Arc<dyn XpLedgerRepository>,
    clock: Arc<dyn Clock>,
}

impl XpLedgerService {
    pub fn new(ledger_repo: Arc<dyn XpLedgerRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger_repo, clock }
    }

    /// Apply a signed delta to the user's ledger, creating it if needed.
    ///
    /// The total is clamped at zero and the level re-derived.
    pub async fn apply_delta(&self, user_id: &UserId, delta: i64) -> Result<AppliedDelta, Error> {
        let applied = self
            .ledger_repo
            .apply_delta(user_id, delta, self.clock.utc())
            .await?;

        info!(
            user_id = %user_id,
            delta,
            applied = applied.change.applied(),
            total_xp = applied.ledger.total_xp,
            level = applied.ledger.level,
            "xp ledger updated"
        );
        if applied.change.levelled_up() {
            info!(
                user_id = %user_id,
                from = applied.change.previous_level,
                to = applied.change.level,
                "level up"
            );
        }
        Ok(applied)
    }

    /// Current ledger; `None` before the first XP-affecting event.
    pub async fn current(&self, user_id: &UserId) -> Result<Option<XpLedger>, Error> {
        Ok(self.ledger_repo.find(user_id).await?)
    }
}
