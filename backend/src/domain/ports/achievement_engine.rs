//! Port for the achievement engine.
//!
//! Every call enlists in a caller-supplied relational transaction; the engine
//! never opens its own. Daily limits and challenge windows are enforced by the
//! engine, so an increment call is not guaranteed to change state.

use async_trait::async_trait;

use crate::domain::{AchievementFamily, AchievementProgress, ActivityShape, Error, UserId};

use super::RelationalTransaction;

/// Narrow achievement engine contract consumed by the coordinators.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AchievementEngine: Send + Sync {
    /// Name of the single in-progress definition for the family, or `None`
    /// when nothing applies.
    async fn resolve_active_achievement(
        &self,
        family: AchievementFamily,
        user_id: &UserId,
        transaction: RelationalTransaction,
    ) -> Result<Option<String>, Error>;

    /// Apply a monotonic increment to the named achievement.
    async fn increment_progress(
        &self,
        achievement_name: &str,
        user_id: &UserId,
        amount: f64,
        transaction: RelationalTransaction,
    ) -> Result<AchievementProgress, Error>;

    /// Feed the independent challenge-badge track.
    async fn check_and_increment_badge_progress(
        &self,
        user_id: &UserId,
        activity: &ActivityShape,
        transaction: RelationalTransaction,
    ) -> Result<(), Error>;
}

/// Fixture engine with no active achievements.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAchievementEngine;

#[async_trait]
impl AchievementEngine for FixtureAchievementEngine {
    async fn resolve_active_achievement(
        &self,
        _family: AchievementFamily,
        _user_id: &UserId,
        _transaction: RelationalTransaction,
    ) -> Result<Option<String>, Error> {
        Ok(None)
    }

    async fn increment_progress(
        &self,
        achievement_name: &str,
        _user_id: &UserId,
        _amount: f64,
        _transaction: RelationalTransaction,
    ) -> Result<AchievementProgress, Error> {
        Ok(AchievementProgress::progressed(achievement_name))
    }

    async fn check_and_increment_badge_progress(
        &self,
        _user_id: &UserId,
        _activity: &ActivityShape,
        _transaction: RelationalTransaction,
    ) -> Result<(), Error> {
        Ok(())
    }
}
