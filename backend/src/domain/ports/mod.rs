//! Domain ports for the two stores, the domain services and the achievement
//! engine.
//!
//! Write operations take an optional store handle. When a coordinator
//! supplies one, the call enlists in that pending transaction instead of
//! opening its own.

mod macros;
pub(crate) use macros::define_port_error;

mod achievement_engine;
mod cardio_service;
mod diet_service;
mod document_store;
mod questionnaire_service;
mod relational_store;
mod training_service;
mod user_account_service;
mod user_statistics_service;

#[cfg(test)]
pub use achievement_engine::MockAchievementEngine;
pub use achievement_engine::{AchievementEngine, FixtureAchievementEngine};
#[cfg(test)]
pub use cardio_service::MockCardioService;
pub use cardio_service::CardioService;
#[cfg(test)]
pub use diet_service::MockDietService;
pub use diet_service::DietService;
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    DocumentSession, DocumentStore, DocumentStoreError, FixtureDocumentStore,
    map_document_store_error,
};
#[cfg(test)]
pub use questionnaire_service::MockQuestionnaireService;
pub use questionnaire_service::QuestionnaireService;
#[cfg(test)]
pub use relational_store::MockRelationalStore;
pub use relational_store::{
    FixtureRelationalStore, RelationalStore, RelationalStoreError, RelationalTransaction,
    map_relational_store_error,
};
#[cfg(test)]
pub use training_service::MockTrainingService;
pub use training_service::TrainingService;
#[cfg(test)]
pub use user_account_service::MockUserAccountService;
pub use user_account_service::UserAccountService;
#[cfg(test)]
pub use user_statistics_service::MockUserStatisticsService;
pub use user_statistics_service::UserStatisticsService;
