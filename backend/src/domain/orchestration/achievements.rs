//! Achievement family evaluation for achievement-bearing operations.
//!
//! Families are evaluated as an ordered list. Each evaluator resolves the
//! active definition and applies its increment; the fold keeps the first
//! outcome that crossed a threshold, falling back to the first outcome with
//! an active achievement.

use std::sync::Arc;

use futures_util::future::{join, join_all};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{AchievementEngine, RelationalTransaction};
use crate::domain::{AchievementFamily, AchievementProgress, ActivityShape, CardioKind, Error, UserId};

/// One family to evaluate and the amount the operation contributes to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilyIncrement {
    pub family: AchievementFamily,
    pub amount: f64,
}

impl FamilyIncrement {
    pub fn new(family: AchievementFamily, amount: f64) -> Self {
        Self { family, amount }
    }
}

/// Relative order of the cardio-type and calorie families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardioPrecedence {
    #[default]
    CardioFirst,
    CalorieFirst,
}

impl CardioPrecedence {
    /// Parse a configured value; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cardio_first" => Some(Self::CardioFirst),
            "calorie_first" => Some(Self::CalorieFirst),
            _ => None,
        }
    }

    /// Family increments for one cardio session, highest precedence first.
    ///
    /// # Examples
    /// ```
    /// use fitness_saga::domain::orchestration::CardioPrecedence;
    /// use fitness_saga::domain::{AchievementFamily, CardioKind};
    ///
    /// let order = CardioPrecedence::CardioFirst.cardio_increments(CardioKind::Running, 5.0, 500.0);
    /// assert_eq!(order[0].family, AchievementFamily::Running);
    /// assert_eq!(order[1].family, AchievementFamily::Calorie);
    /// ```
    pub fn cardio_increments(
        self,
        kind: CardioKind,
        distance_km: f64,
        calories: f64,
    ) -> [FamilyIncrement; 2] {
        let cardio = FamilyIncrement::new(AchievementFamily::for_cardio(kind), distance_km);
        let calorie = FamilyIncrement::new(AchievementFamily::Calorie, calories);
        match self {
            Self::CardioFirst => [cardio, calorie],
            Self::CalorieFirst => [calorie, cardio],
        }
    }
}

/// Fold evaluated outcomes, taken in precedence order, to the most
/// significant one.
pub fn select_most_significant(
    outcomes: impl IntoIterator<Item = AchievementProgress>,
) -> AchievementProgress {
    let mut first_active = None;
    for outcome in outcomes {
        if outcome.crossed_threshold {
            return outcome;
        }
        if first_active.is_none() && outcome.achievement_name.is_some() {
            first_active = Some(outcome);
        }
    }
    first_active.unwrap_or_else(AchievementProgress::none)
}

/// Evaluates family increments against the achievement engine inside one
/// relational transaction.
#[derive(Clone)]
pub struct AchievementEvaluator {
    engine: Arc<dyn AchievementEngine>,
}

impl AchievementEvaluator {
    pub fn new(engine: Arc<dyn AchievementEngine>) -> Self {
        Self { engine }
    }

    /// Evaluate every family and the challenge track concurrently.
    ///
    /// All branches are awaited before deciding. The first error in
    /// precedence order wins, with the challenge track ranked last.
    pub async fn evaluate(
        &self,
        user_id: &UserId,
        increments: &[FamilyIncrement],
        challenge: Option<&ActivityShape>,
        transaction: RelationalTransaction,
    ) -> Result<AchievementProgress, Error> {
        let families = join_all(
            increments
                .iter()
                .map(|increment| self.evaluate_family(user_id, *increment, transaction)),
        );
        let challenge_track = async {
            match challenge {
                Some(activity) => {
                    self.engine
                        .check_and_increment_badge_progress(user_id, activity, transaction)
                        .await
                }
                None => Ok(()),
            }
        };

        let (outcomes, challenge_result) = join(families, challenge_track).await;
        let outcomes = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;
        challenge_result?;
        Ok(select_most_significant(outcomes))
    }

    async fn evaluate_family(
        &self,
        user_id: &UserId,
        increment: FamilyIncrement,
        transaction: RelationalTransaction,
    ) -> Result<AchievementProgress, Error> {
        if increment.amount.is_nan() || increment.amount <= 0.0 {
            return Ok(AchievementProgress::none());
        }
        let resolved = self
            .engine
            .resolve_active_achievement(increment.family, user_id, transaction)
            .await?;
        let Some(name) = resolved.filter(|name| !name.trim().is_empty()) else {
            return Ok(AchievementProgress::none());
        };
        self.engine
            .increment_progress(&name, user_id, increment.amount, transaction)
            .await
    }
}

#[cfg(test)]
#[path = "achievements_tests.rs"]
mod tests;
