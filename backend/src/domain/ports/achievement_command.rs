//! Driving port for achievement evaluation and title-addressed grants.
//!
//! Both operations are safe to call speculatively: an achievement that is
//! already held, or a title that does not exist, is silently not granted.

use async_trait::async_trait;

use crate::domain::{Achievement, Error, GrantOutcome, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AchievementCommand: Send + Sync {
    /// Grant every not-yet-held achievement whose threshold the user now
    /// meets. Returns the achievements granted by this call.
    async fn reevaluate(&self, user_id: &UserId) -> Result<Vec<Achievement>, Error>;

    /// Grant a catalogue entry by its title, typically a special one.
    ///
    /// # Examples
    /// ```
    /// use progression::domain::ports::{AchievementCommand, FixtureAchievementCommand};
    /// use progression::domain::{FIRST_APPROVAL_TITLE, UserId};
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let outcome = FixtureAchievementCommand
    ///     .grant_by_title(&UserId::random(), FIRST_APPROVAL_TITLE)
    ///     .await
    ///     .expect("fixture grant");
    /// assert!(!outcome.is_granted());
    /// # });
    /// ```
    async fn grant_by_title(&self, user_id: &UserId, title: &str) -> Result<GrantOutcome, Error>;
}

/// Fixture command that never grants anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAchievementCommand;

#[async_trait]
impl AchievementCommand for FixtureAchievementCommand {
    async fn reevaluate(&self, _user_id: &UserId) -> Result<Vec<Achievement>, Error> {
        Ok(Vec::new())
    }

    async fn grant_by_title(
        &self,
        _user_id: &UserId,
        _title: &str,
    ) -> Result<GrantOutcome, Error> {
        Ok(GrantOutcome::NotGranted)
    }
}
