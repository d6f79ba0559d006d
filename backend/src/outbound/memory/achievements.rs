//! In-memory achievement engine over the relational store.
//!
//! Definitions in a family form tiers ordered by threshold. The active
//! definition is the lowest tier the user has not completed yet, so crossing
//! a threshold moves the family on to the next tier, which starts from zero.
//! Challenges run alongside the tiers: each one counts a single activity kind
//! inside a date window, and completes once its target is reached.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{AchievementEngine, RelationalTransaction};
use crate::domain::{
    AchievementFamily, AchievementProgress, ActivityKind, ActivityShape, EarnedBadge, Error,
    UserId,
};

use super::relational::{
    MemoryRelationalStore, RelationalKey, RelationalRow, RelationalRows, relational_error,
};

/// One achievement tier.
#[derive(Debug, Clone, PartialEq)]
pub struct AchievementDefinition {
    pub name: String,
    pub family: AchievementFamily,
    pub threshold: f64,
    pub image: String,
    pub generative_text: String,
    /// Maximum number of counted increments per calendar day.
    pub daily_limit: Option<u32>,
}

/// Date-scoped challenge badge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeDefinition {
    pub name: String,
    pub activity: ActivityKind,
    pub target: f64,
    /// First counted day, inclusive.
    pub starts_on: NaiveDate,
    /// Last counted day, inclusive.
    pub ends_on: NaiveDate,
}

impl ChallengeDefinition {
    fn counts(&self, activity: &ActivityShape) -> bool {
        self.activity == activity.kind
            && (self.starts_on..=self.ends_on).contains(&activity.date)
            && activity.quantity > 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AchievementCatalog {
    pub achievements: Vec<AchievementDefinition>,
    pub challenges: Vec<ChallengeDefinition>,
}

impl AchievementCatalog {
    fn tiers(&self, family: AchievementFamily) -> Vec<&AchievementDefinition> {
        let mut tiers: Vec<_> = self
            .achievements
            .iter()
            .filter(|definition| definition.family == family)
            .collect();
        tiers.sort_by(|left, right| left.threshold.total_cmp(&right.threshold));
        tiers
    }

    fn definition(&self, name: &str) -> Option<&AchievementDefinition> {
        self.achievements
            .iter()
            .find(|definition| definition.name == name)
    }
}

/// Stored progress toward one achievement definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressRow {
    pub progress: f64,
    pub completed: bool,
    /// Day the daily-limit counter refers to.
    pub limited_on: Option<NaiveDate>,
    pub increments_that_day: u32,
}

impl ProgressRow {
    fn limit_reached(&self, limit: Option<u32>, today: NaiveDate) -> bool {
        limit.is_some_and(|limit| {
            self.limited_on == Some(today) && self.increments_that_day >= limit
        })
    }

    fn count_increment(&mut self, today: NaiveDate) {
        if self.limited_on != Some(today) {
            self.limited_on = Some(today);
            self.increments_that_day = 0;
        }
        self.increments_that_day += 1;
    }
}

/// Stored progress toward one challenge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChallengeRow {
    pub progress: f64,
    pub completed_on: Option<NaiveDate>,
}

fn read_progress(
    rows: &mut RelationalRows,
    id: Uuid,
    key: &RelationalKey,
) -> Result<ProgressRow, Error> {
    match rows.read(id, key).map_err(relational_error)? {
        Some(RelationalRow::Progress(row)) => Ok(row),
        Some(_) => Err(Error::internal(format!("row {key:?} is not achievement progress"))),
        None => Ok(ProgressRow::default()),
    }
}

fn read_challenge(
    rows: &mut RelationalRows,
    id: Uuid,
    key: &RelationalKey,
) -> Result<ChallengeRow, Error> {
    match rows.read(id, key).map_err(relational_error)? {
        Some(RelationalRow::Challenge(row)) => Ok(row),
        Some(_) => Err(Error::internal(format!("row {key:?} is not challenge progress"))),
        None => Ok(ChallengeRow::default()),
    }
}

/// Achievement engine whose progress rows live in [`MemoryRelationalStore`].
pub struct MemoryAchievementEngine {
    store: Arc<MemoryRelationalStore>,
    catalog: AchievementCatalog,
    clock: Arc<dyn Clock>,
}

impl MemoryAchievementEngine {
    pub fn new(
        store: Arc<MemoryRelationalStore>,
        catalog: AchievementCatalog,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
        }
    }

    fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }
}

#[async_trait]
impl AchievementEngine for MemoryAchievementEngine {
    async fn resolve_active_achievement(
        &self,
        family: AchievementFamily,
        user_id: &UserId,
        transaction: RelationalTransaction,
    ) -> Result<Option<String>, Error> {
        let tiers = self.catalog.tiers(family);
        self.store.with_transaction(Some(transaction), |rows, id| {
            for definition in tiers {
                let key = RelationalKey::Progress(user_id.clone(), definition.name.clone());
                if !read_progress(rows, id, &key)?.completed {
                    return Ok(Some(definition.name.clone()));
                }
            }
            Ok(None)
        })
    }

    async fn increment_progress(
        &self,
        achievement_name: &str,
        user_id: &UserId,
        amount: f64,
        transaction: RelationalTransaction,
    ) -> Result<AchievementProgress, Error> {
        let definition = self.catalog.definition(achievement_name).ok_or_else(|| {
            Error::not_found(format!("achievement {achievement_name} is not defined"))
        })?;
        let today = self.today();

        self.store.with_transaction(Some(transaction), |rows, id| {
            let key = RelationalKey::Progress(user_id.clone(), definition.name.clone());
            let mut row = read_progress(rows, id, &key)?;
            if row.completed || row.limit_reached(definition.daily_limit, today) {
                debug!(
                    achievement = %definition.name,
                    user_id = %user_id,
                    "increment not counted"
                );
                return Ok(AchievementProgress::progressed(definition.name.clone()));
            }

            if definition.daily_limit.is_some() {
                row.count_increment(today);
            }
            row.progress += amount;
            row.completed = row.progress >= definition.threshold;
            let completed = row.completed;
            rows.write(id, key, Some(RelationalRow::Progress(row)))
                .map_err(relational_error)?;

            if !completed {
                return Ok(AchievementProgress::progressed(definition.name.clone()));
            }
            let badge = EarnedBadge {
                name: definition.name.clone(),
                image: definition.image.clone(),
                generative_text: definition.generative_text.clone(),
                threshold: definition.threshold,
            };
            Ok(AchievementProgress::earned(definition.name.clone(), badge))
        })
    }

    async fn check_and_increment_badge_progress(
        &self,
        user_id: &UserId,
        activity: &ActivityShape,
        transaction: RelationalTransaction,
    ) -> Result<(), Error> {
        let challenges: Vec<_> = self
            .catalog
            .challenges
            .iter()
            .filter(|challenge| challenge.counts(activity))
            .collect();
        if challenges.is_empty() {
            return Ok(());
        }

        self.store.with_transaction(Some(transaction), |rows, id| {
            for challenge in challenges {
                let key = RelationalKey::Challenge(user_id.clone(), challenge.name.clone());
                let mut row = read_challenge(rows, id, &key)?;
                if row.completed_on.is_some() {
                    continue;
                }
                row.progress += activity.quantity;
                if row.progress >= challenge.target {
                    row.completed_on = Some(activity.date);
                }
                rows.write(id, key, Some(RelationalRow::Challenge(row)))
                    .map_err(relational_error)?;
            }
            Ok(())
        })
    }
}
