//! Experience-point ledger arithmetic.
//!
//! [`XpLedger::apply_delta`] is the only place where a user's total XP and
//! level change. Every adapter that persists a ledger row runs this method
//! on the locked row rather than doing its own arithmetic, so the level is
//! always derived from the total by [`level_for_xp`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// XP needed to advance one level. The single level divisor used anywhere.
pub const XP_PER_LEVEL: i64 = 100;

/// Level reached with `total_xp` points: `floor(total_xp / XP_PER_LEVEL) + 1`.
///
/// # Examples
/// ```
/// use progression::domain::level_for_xp;
///
/// assert_eq!(level_for_xp(0), 1);
/// assert_eq!(level_for_xp(99), 1);
/// assert_eq!(level_for_xp(100), 2);
/// ```
pub fn level_for_xp(total_xp: i64) -> i32 {
    let steps = total_xp.max(0) / XP_PER_LEVEL;
    i32::try_from(steps.saturating_add(1)).unwrap_or(i32::MAX)
}

/// Per-user XP balance, level and activity streak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpLedger {
    pub user_id: UserId,
    /// Never negative; debits below zero clamp to zero.
    pub total_xp: i64,
    /// Always `level_for_xp(total_xp)`.
    pub level: i32,
    /// Consecutive UTC days with at least one XP gain.
    pub streak_days: i32,
    pub last_activity_on: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

/// Before/after snapshot of a ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpChange {
    pub previous_total: i64,
    pub total_xp: i64,
    pub previous_level: i32,
    pub level: i32,
}

impl XpChange {
    /// Amount actually applied after clamping.
    pub const fn applied(&self) -> i64 {
        self.total_xp - self.previous_total
    }

    pub const fn levelled_up(&self) -> bool {
        self.level > self.previous_level
    }
}

impl XpLedger {
    /// Ledger for a user with no XP history, created lazily on first use.
    pub fn empty(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            total_xp: 0,
            level: level_for_xp(0),
            streak_days: 0,
            last_activity_on: None,
            updated_at: now,
        }
    }

    /// Apply a signed XP delta, clamping the total at zero.
    ///
    /// Positive deltas also record activity for streak accounting: a gain on
    /// the day after the last active day extends the streak, a gain on the
    /// same day keeps it, and any longer gap restarts it at one.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use progression::domain::{UserId, XpLedger};
    ///
    /// let mut ledger = XpLedger::empty(UserId::random(), Utc::now());
    /// ledger.apply_delta(150, Utc::now());
    /// let change = ledger.apply_delta(-400, Utc::now());
    /// assert_eq!(ledger.total_xp, 0);
    /// assert_eq!(change.applied(), -150);
    /// assert_eq!(ledger.level, 1);
    /// ```
    pub fn apply_delta(&mut self, delta: i64, now: DateTime<Utc>) -> XpChange {
        let previous_total = self.total_xp;
        let previous_level = self.level;

        self.total_xp = self.total_xp.saturating_add(delta).max(0);
        self.level = level_for_xp(self.total_xp);
        if delta > 0 {
            self.record_activity(now.date_naive());
        }
        self.updated_at = now;

        XpChange {
            previous_total,
            total_xp: self.total_xp,
            previous_level,
            level: self.level,
        }
    }

    fn record_activity(&mut self, today: NaiveDate) {
        self.streak_days = match self.last_activity_on {
            Some(last) if last == today => self.streak_days.max(1),
            Some(last) if last.succ_opt() == Some(today) => self.streak_days.saturating_add(1),
            _ => 1,
        };
        self.last_activity_on = Some(today);
    }
}
