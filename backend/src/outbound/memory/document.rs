//! In-memory document store: cardio days, training days, statistics, meals
//! and questionnaires, one document per key.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{
    CardioService, DietService, DocumentSession, DocumentStore, DocumentStoreError,
    QuestionnaireService, TrainingService, UserStatisticsService, map_document_store_error,
};
use crate::domain::{
    AddTrainingSeries, CardioExercise, Error, PublishedMeal, Questionnaire, StatisticDelta,
    StatisticType, StatisticValue, TrainingDay, TrainingExercise, UserId, UserStatistics,
};

use super::mvcc::{CommittedSnapshot, MvccError, VersionedStore};

/// Document identity in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    CardioDay(UserId, NaiveDate),
    TrainingDay(UserId, NaiveDate),
    Statistics(UserId),
    Meal(Uuid),
    Questionnaire(UserId),
}

/// Stored document body.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    CardioDay(Vec<CardioExercise>),
    TrainingDay(TrainingDay),
    Statistics(UserStatistics),
    Meal(PublishedMeal),
    Questionnaire(Questionnaire),
}

pub type DocumentSnapshot = CommittedSnapshot<DocumentKey, Document>;
type Documents = VersionedStore<DocumentKey, Document>;

fn map_mvcc_error(error: MvccError) -> DocumentStoreError {
    match error {
        MvccError::UnknownTransaction(id) => {
            DocumentStoreError::unknown_session(format!("doc-{id}"))
        }
        MvccError::Conflict(message) => DocumentStoreError::transient_conflict(message),
    }
}

fn document_error(error: MvccError) -> Error {
    map_document_store_error(map_mvcc_error(error))
}

fn shape_mismatch(key: &DocumentKey) -> Error {
    map_document_store_error(DocumentStoreError::query(format!(
        "document {key:?} has an unexpected shape"
    )))
}

/// Document store adapter backed by [`VersionedStore`].
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<Documents>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Documents>, DocumentStoreError> {
        self.documents
            .lock()
            .map_err(|_| DocumentStoreError::connection("document store mutex poisoned"))
    }

    /// Run `work` inside `session`, or inside a private session committed on
    /// success when none is supplied.
    fn with_session<T>(
        &self,
        session: Option<DocumentSession>,
        work: impl FnOnce(&mut Documents, Uuid) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut documents = self.lock().map_err(map_document_store_error)?;
        if let Some(session) = session {
            return work(&mut *documents, session.id());
        }

        let id = Uuid::new_v4();
        documents.begin(id);
        match work(&mut *documents, id) {
            Ok(value) => {
                documents.commit(id).map_err(document_error)?;
                Ok(value)
            }
            Err(error) => {
                if let Err(abort_error) = documents.abort(id) {
                    let source = map_mvcc_error(abort_error);
                    warn!(session = %id, error = %source, "private session abort failed");
                }
                Err(error)
            }
        }
    }

    pub fn committed_statistics(&self, user_id: &UserId) -> UserStatistics {
        match self.committed(&DocumentKey::Statistics(user_id.clone())) {
            Some(Document::Statistics(statistics)) => statistics,
            _ => UserStatistics::default(),
        }
    }

    pub fn committed_cardio_day(&self, user_id: &UserId, date: NaiveDate) -> Vec<CardioExercise> {
        match self.committed(&DocumentKey::CardioDay(user_id.clone(), date)) {
            Some(Document::CardioDay(exercises)) => exercises,
            _ => Vec::new(),
        }
    }

    pub fn committed_training_day(&self, user_id: &UserId, date: NaiveDate) -> TrainingDay {
        match self.committed(&DocumentKey::TrainingDay(user_id.clone(), date)) {
            Some(Document::TrainingDay(day)) => day,
            _ => TrainingDay::default(),
        }
    }

    pub fn committed_meal(&self, meal_id: Uuid) -> Option<PublishedMeal> {
        match self.committed(&DocumentKey::Meal(meal_id)) {
            Some(Document::Meal(meal)) => Some(meal),
            _ => None,
        }
    }

    pub fn committed_questionnaire(&self, user_id: &UserId) -> Option<Questionnaire> {
        match self.committed(&DocumentKey::Questionnaire(user_id.clone())) {
            Some(Document::Questionnaire(questionnaire)) => Some(questionnaire),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Option<DocumentSnapshot> {
        self.lock().ok().map(|documents| documents.snapshot())
    }

    pub fn open_sessions(&self) -> usize {
        self.lock().map_or(0, |documents| documents.open_transactions())
    }

    fn committed(&self, key: &DocumentKey) -> Option<Document> {
        self.lock().ok()?.committed_value(key)
    }
}

fn read_statistics(
    documents: &mut Documents,
    id: Uuid,
    key: &DocumentKey,
) -> Result<UserStatistics, Error> {
    match documents.read(id, key).map_err(document_error)? {
        None => Ok(UserStatistics::default()),
        Some(Document::Statistics(statistics)) => Ok(statistics),
        Some(_) => Err(shape_mismatch(key)),
    }
}

fn read_cardio_day(
    documents: &mut Documents,
    id: Uuid,
    key: &DocumentKey,
) -> Result<Vec<CardioExercise>, Error> {
    match documents.read(id, key).map_err(document_error)? {
        None => Ok(Vec::new()),
        Some(Document::CardioDay(exercises)) => Ok(exercises),
        Some(_) => Err(shape_mismatch(key)),
    }
}

fn read_training_day(
    documents: &mut Documents,
    id: Uuid,
    key: &DocumentKey,
) -> Result<TrainingDay, Error> {
    match documents.read(id, key).map_err(document_error)? {
        None => Ok(TrainingDay::default()),
        Some(Document::TrainingDay(day)) => Ok(day),
        Some(_) => Err(shape_mismatch(key)),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn start_session(&self) -> Result<DocumentSession, DocumentStoreError> {
        let id = Uuid::new_v4();
        self.lock()?.begin(id);
        let session = DocumentSession::new(id);
        debug!(session = %session, "document session started");
        Ok(session)
    }

    async fn commit(&self, session: DocumentSession) -> Result<(), DocumentStoreError> {
        self.lock()?.commit(session.id()).map_err(map_mvcc_error)
    }

    async fn abort(&self, session: DocumentSession) -> Result<(), DocumentStoreError> {
        self.lock()?.abort(session.id()).map_err(map_mvcc_error)
    }
}

#[async_trait]
impl CardioService for MemoryDocumentStore {
    async fn append_exercise(
        &self,
        user_id: &UserId,
        exercise: &CardioExercise,
        session: Option<DocumentSession>,
    ) -> Result<(), Error> {
        self.with_session(session, |documents, id| {
            let key = DocumentKey::CardioDay(user_id.clone(), exercise.date());
            let mut day = read_cardio_day(documents, id, &key)?;
            if day.iter().any(|logged| logged.id() == exercise.id()) {
                return Err(Error::already_exists(format!(
                    "cardio exercise {} is already logged",
                    exercise.id()
                )));
            }
            day.push(exercise.clone());
            documents
                .write(id, key, Some(Document::CardioDay(day)))
                .map_err(document_error)
        })
    }

    async fn find_exercises(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        exercise_ids: &[Uuid],
        session: Option<DocumentSession>,
    ) -> Result<Vec<CardioExercise>, Error> {
        self.with_session(session, |documents, id| {
            let key = DocumentKey::CardioDay(user_id.clone(), date);
            let day = read_cardio_day(documents, id, &key)?;
            Ok(day
                .into_iter()
                .filter(|exercise| exercise_ids.contains(&exercise.id()))
                .collect())
        })
    }

    async fn remove_exercises(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        exercise_ids: &[Uuid],
        session: Option<DocumentSession>,
    ) -> Result<usize, Error> {
        self.with_session(session, |documents, id| {
            let key = DocumentKey::CardioDay(user_id.clone(), date);
            let mut day = read_cardio_day(documents, id, &key)?;
            let before = day.len();
            day.retain(|exercise| !exercise_ids.contains(&exercise.id()));
            let removed = before - day.len();
            if removed > 0 {
                let document = (!day.is_empty()).then_some(Document::CardioDay(day));
                documents
                    .write(id, key, document)
                    .map_err(document_error)?;
            }
            Ok(removed)
        })
    }
}

#[async_trait]
impl TrainingService for MemoryDocumentStore {
    async fn append_series(
        &self,
        user_id: &UserId,
        command: &AddTrainingSeries,
        session: Option<DocumentSession>,
    ) -> Result<(), Error> {
        self.with_session(session, |documents, id| {
            let key = DocumentKey::TrainingDay(user_id.clone(), command.date);
            let mut day = read_training_day(documents, id, &key)?;
            match day
                .exercises
                .iter_mut()
                .find(|exercise| exercise.id == command.exercise_id)
            {
                Some(exercise) => exercise.series.extend(command.series.iter().cloned()),
                None => day.exercises.push(TrainingExercise {
                    id: command.exercise_id,
                    name: command.exercise_name.clone(),
                    series: command.series.clone(),
                }),
            }
            documents
                .write(id, key, Some(Document::TrainingDay(day)))
                .map_err(document_error)
        })
    }

    async fn training_day(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        session: Option<DocumentSession>,
    ) -> Result<TrainingDay, Error> {
        self.with_session(session, |documents, id| {
            read_training_day(documents, id, &DocumentKey::TrainingDay(user_id.clone(), date))
        })
    }

    async fn replace_exercises(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        exercises: &[TrainingExercise],
        session: Option<DocumentSession>,
    ) -> Result<(), Error> {
        self.with_session(session, |documents, id| {
            let key = DocumentKey::TrainingDay(user_id.clone(), date);
            let mut day = read_training_day(documents, id, &key)?;
            for replacement in exercises {
                match day
                    .exercises
                    .iter_mut()
                    .find(|exercise| exercise.id == replacement.id)
                {
                    Some(exercise) => *exercise = replacement.clone(),
                    None => day.exercises.push(replacement.clone()),
                }
            }
            day.exercises.retain(|exercise| !exercise.series.is_empty());
            let document = (!day.exercises.is_empty()).then_some(Document::TrainingDay(day));
            documents.write(id, key, document).map_err(document_error)
        })
    }
}

#[async_trait]
impl UserStatisticsService for MemoryDocumentStore {
    async fn apply_deltas(
        &self,
        user_id: &UserId,
        deltas: &[StatisticDelta],
        session: Option<DocumentSession>,
    ) -> Result<(), Error> {
        self.with_session(session, |documents, id| {
            if deltas.iter().all(StatisticDelta::is_zero) {
                return Ok(());
            }
            let key = DocumentKey::Statistics(user_id.clone());
            let mut statistics = read_statistics(documents, id, &key)?;
            deltas.iter().for_each(|delta| statistics.apply(delta));
            documents
                .write(id, key, Some(Document::Statistics(statistics)))
                .map_err(document_error)
        })
    }

    async fn replace_daily_value(
        &self,
        user_id: &UserId,
        absolute: &StatisticDelta,
        session: Option<DocumentSession>,
    ) -> Result<StatisticDelta, Error> {
        self.with_session(session, |documents, id| {
            let key = DocumentKey::Statistics(user_id.clone());
            let mut statistics = read_statistics(documents, id, &key)?;
            let applied = statistics.replace_daily(absolute);
            documents
                .write(id, key, Some(Document::Statistics(statistics)))
                .map_err(document_error)?;
            Ok(applied)
        })
    }

    async fn daily_value(
        &self,
        user_id: &UserId,
        kind: StatisticType,
        date: NaiveDate,
        session: Option<DocumentSession>,
    ) -> Result<StatisticValue, Error> {
        self.with_session(session, |documents, id| {
            let statistics =
                read_statistics(documents, id, &DocumentKey::Statistics(user_id.clone()))?;
            Ok(statistics.daily(kind, date))
        })
    }
}

#[async_trait]
impl DietService for MemoryDocumentStore {
    async fn publish_meal(
        &self,
        meal: &PublishedMeal,
        session: Option<DocumentSession>,
    ) -> Result<(), Error> {
        self.with_session(session, |documents, id| {
            let key = DocumentKey::Meal(meal.id);
            if documents.read(id, &key).map_err(document_error)?.is_some() {
                return Err(Error::already_exists(format!(
                    "meal {} is already published",
                    meal.id
                )));
            }
            documents
                .write(id, key, Some(Document::Meal(meal.clone())))
                .map_err(document_error)
        })
    }
}

#[async_trait]
impl QuestionnaireService for MemoryDocumentStore {
    async fn save_questionnaire(
        &self,
        user_id: &UserId,
        questionnaire: &Questionnaire,
        session: Option<DocumentSession>,
    ) -> Result<(), Error> {
        self.with_session(session, |documents, id| {
            let key = DocumentKey::Questionnaire(user_id.clone());
            if documents.read(id, &key).map_err(document_error)?.is_some() {
                return Err(Error::already_exists(format!(
                    "user {user_id} already answered the questionnaire"
                )));
            }
            documents
                .write(id, key, Some(Document::Questionnaire(questionnaire.clone())))
                .map_err(document_error)
        })
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
