//! Port wrappers that fail a chosen method before delegating.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use fitness_saga::domain::ports::{
    AchievementEngine, CardioService, DietService, DocumentSession, QuestionnaireService,
    RelationalStore, RelationalStoreError, RelationalTransaction, TrainingService,
    UserAccountService, UserStatisticsService,
};
use fitness_saga::domain::{
    AchievementFamily, AchievementProgress, ActivityShape, AddTrainingSeries, CardioExercise,
    Error, PublishedMeal, Questionnaire, StatisticDelta, StatisticType, StatisticValue,
    TrainingDay, TrainingExercise, UserAccount, UserId,
};
use fitness_saga::outbound::memory::{MemoryDocumentStore, MemoryRelationalStore};
use uuid::Uuid;

/// Failure budget shared by a wrapper and the test observing it.
#[derive(Debug)]
pub struct Trigger {
    method: &'static str,
    remaining: AtomicUsize,
    calls: AtomicUsize,
    error: Error,
}

impl Trigger {
    /// Fail every call to `method`.
    pub fn always(method: &'static str, error: Error) -> Arc<Self> {
        Self::first(method, usize::MAX, error)
    }

    /// Fail the first `count` calls to `method`, then delegate.
    pub fn first(method: &'static str, count: usize, error: Error) -> Arc<Self> {
        Arc::new(Self {
            method,
            remaining: AtomicUsize::new(count),
            calls: AtomicUsize::new(0),
            error,
        })
    }

    /// Calls observed on the armed method.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, method: &str) -> Result<(), Error> {
        if method != self.method {
            return Ok(());
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        let armed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if armed {
            Err(self.error.clone())
        } else {
            Ok(())
        }
    }
}

/// Document-side services with one armed method.
pub struct FaultyDocuments {
    pub inner: Arc<MemoryDocumentStore>,
    pub trigger: Arc<Trigger>,
}

#[async_trait]
impl CardioService for FaultyDocuments {
    async fn append_exercise(
        &self,
        user_id: &UserId,
        exercise: &CardioExercise,
        session: Option<DocumentSession>,
    ) -> Result<(), Error> {
        self.trigger.check("append_exercise")?;
        self.inner.append_exercise(user_id, exercise, session).await
    }

    async fn find_exercises(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        exercise_ids: &[Uuid],
        session: Option<DocumentSession>,
    ) -> Result<Vec<CardioExercise>, Error> {
        self.trigger.check("find_exercises")?;
        self.inner
            .find_exercises(user_id, date, exercise_ids, session)
            .await
    }

    async fn remove_exercises(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        exercise_ids: &[Uuid],
        session: Option<DocumentSession>,
    ) -> Result<usize, Error> {
        self.trigger.check("remove_exercises")?;
        self.inner
            .remove_exercises(user_id, date, exercise_ids, session)
            .await
    }
}

#[async_trait]
impl UserStatisticsService for FaultyDocuments {
    async fn apply_deltas(
        &self,
        user_id: &UserId,
        deltas: &[StatisticDelta],
        session: Option<DocumentSession>,
    ) -> Result<(), Error> {
        self.trigger.check("apply_deltas")?;
        self.inner.apply_deltas(user_id, deltas, session).await
    }

    async fn replace_daily_value(
        &self,
        user_id: &UserId,
        absolute: &StatisticDelta,
        session: Option<DocumentSession>,
    ) -> Result<StatisticDelta, Error> {
        self.trigger.check("replace_daily_value")?;
        self.inner
            .replace_daily_value(user_id, absolute, session)
            .await
    }

    async fn daily_value(
        &self,
        user_id: &UserId,
        kind: StatisticType,
        date: NaiveDate,
        session: Option<DocumentSession>,
    ) -> Result<StatisticValue, Error> {
        self.trigger.check("daily_value")?;
        self.inner.daily_value(user_id, kind, date, session).await
    }
}

#[async_trait]
impl TrainingService for FaultyDocuments {
    async fn append_series(
        &self,
        user_id: &UserId,
        command: &AddTrainingSeries,
        session: Option<DocumentSession>,
    ) -> Result<(), Error> {
        self.trigger.check("append_series")?;
        self.inner.append_series(user_id, command, session).await
    }

    async fn training_day(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        session: Option<DocumentSession>,
    ) -> Result<TrainingDay, Error> {
        self.trigger.check("training_day")?;
        self.inner.training_day(user_id, date, session).await
    }

    async fn replace_exercises(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        exercises: &[TrainingExercise],
        session: Option<DocumentSession>,
    ) -> Result<(), Error> {
        self.trigger.check("replace_exercises")?;
        self.inner
            .replace_exercises(user_id, date, exercises, session)
            .await
    }
}

#[async_trait]
impl DietService for FaultyDocuments {
    async fn publish_meal(
        &self,
        meal: &PublishedMeal,
        session: Option<DocumentSession>,
    ) -> Result<(), Error> {
        self.trigger.check("publish_meal")?;
        self.inner.publish_meal(meal, session).await
    }
}

#[async_trait]
impl QuestionnaireService for FaultyDocuments {
    async fn save_questionnaire(
        &self,
        user_id: &UserId,
        questionnaire: &Questionnaire,
        session: Option<DocumentSession>,
    ) -> Result<(), Error> {
        self.trigger.check("save_questionnaire")?;
        self.inner
            .save_questionnaire(user_id, questionnaire, session)
            .await
    }
}

/// Relational store and account service with one armed method.
///
/// An armed `commit` rolls the transaction back before reporting the error,
/// as a real store does when a commit is refused.
pub struct FaultyRelational {
    pub inner: Arc<MemoryRelationalStore>,
    pub trigger: Arc<Trigger>,
}

impl FaultyRelational {
    fn store_error(&self, method: &str) -> Result<(), RelationalStoreError> {
        self.trigger.check(method).map_err(|error| {
            if error.is_transient_conflict() {
                RelationalStoreError::transient_conflict(error.message())
            } else {
                RelationalStoreError::connection(error.message())
            }
        })
    }
}

#[async_trait]
impl RelationalStore for FaultyRelational {
    async fn begin(&self) -> Result<RelationalTransaction, RelationalStoreError> {
        self.store_error("begin")?;
        self.inner.begin().await
    }

    async fn commit(&self, transaction: RelationalTransaction) -> Result<(), RelationalStoreError> {
        if let Err(refused) = self.store_error("commit") {
            self.inner.abort(transaction).await?;
            return Err(refused);
        }
        self.inner.commit(transaction).await
    }

    async fn abort(&self, transaction: RelationalTransaction) -> Result<(), RelationalStoreError> {
        self.store_error("abort")?;
        self.inner.abort(transaction).await
    }
}

#[async_trait]
impl UserAccountService for FaultyRelational {
    async fn create_account(
        &self,
        account: &UserAccount,
        transaction: Option<RelationalTransaction>,
    ) -> Result<(), Error> {
        self.trigger.check("create_account")?;
        self.inner.create_account(account, transaction).await
    }
}

/// Achievement engine with one armed method.
pub struct FaultyAchievements {
    pub inner: Arc<dyn AchievementEngine>,
    pub trigger: Arc<Trigger>,
}

#[async_trait]
impl AchievementEngine for FaultyAchievements {
    async fn resolve_active_achievement(
        &self,
        family: AchievementFamily,
        user_id: &UserId,
        transaction: RelationalTransaction,
    ) -> Result<Option<String>, Error> {
        self.trigger.check("resolve_active_achievement")?;
        self.inner
            .resolve_active_achievement(family, user_id, transaction)
            .await
    }

    async fn increment_progress(
        &self,
        achievement_name: &str,
        user_id: &UserId,
        amount: f64,
        transaction: RelationalTransaction,
    ) -> Result<AchievementProgress, Error> {
        self.trigger.check("increment_progress")?;
        self.inner
            .increment_progress(achievement_name, user_id, amount, transaction)
            .await
    }

    async fn check_and_increment_badge_progress(
        &self,
        user_id: &UserId,
        activity: &ActivityShape,
        transaction: RelationalTransaction,
    ) -> Result<(), Error> {
        self.trigger.check("check_and_increment_badge_progress")?;
        self.inner
            .check_and_increment_badge_progress(user_id, activity, transaction)
            .await
    }
}
