//! Domain primitives, ports, and the cross-store orchestration core.
//!
//! Purpose: define strongly typed records for the fitness domain, the ports
//! through which the stores, domain services and achievement engine are
//! reached, and the coordinators that run each business operation as a
//! two-store saga.
//!
//! Public surface:
//! - Error / ErrorCode: normalized collaborator failure.
//! - OperationResult / OperationOutcome: flat contract for transport layers.
//! - StatisticDelta / UserStatistics: signed aggregate contributions.
//! - AchievementFamily / AchievementProgress: achievement engine vocabulary.
//! - orchestration: saga runner, unit of work, retry policy, coordinators.

pub mod achievement;
pub mod cardio;
pub mod diet;
pub mod error;
pub mod orchestration;
pub mod outcome;
pub mod ports;
pub mod registration;
pub mod statistics;
pub mod training;
pub mod user;

pub use self::achievement::{
    AchievementFamily, AchievementProgress, ActivityKind, ActivityShape, EarnedBadge,
};
pub use self::cardio::{
    CardioExercise, CardioExerciseDraft, CardioKind, CardioValidationError, DeleteCardioExercises,
    LogCardioExercise,
};
pub use self::diet::{PublishMeal, PublishedMeal};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::outcome::{OperationOutcome, OperationResult};
pub use self::registration::{ActivityLevel, FitnessGoal, Questionnaire, RegisterWithQuestionnaire};
pub use self::statistics::{
    AddDailySteps, StatisticDelta, StatisticDeltaError, StatisticType, StatisticValue,
    UserStatistics,
};
pub use self::training::{
    AddTrainingSeries, RecomputedDay, RemoveTrainingSeries, SeriesEditError, SeriesRef,
    SeriesUpdate, TrainingDay, TrainingExercise, TrainingSeries, UpdateTrainingSeries,
};
pub use self::user::{DisplayName, UserAccount, UserId, UserValidationError};
