//! Registration and onboarding questionnaire.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DisplayName;

/// Goal selected during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    LoseWeight,
    Maintain,
    GainMuscle,
}

/// Self-reported activity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
}

/// Answers collected during onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    pub goal: FitnessGoal,
    pub activity_level: ActivityLevel,
    pub height_cm: f64,
    pub weight_kg: f64,
    /// Day the initial weight was measured.
    pub measured_on: NaiveDate,
}

/// Command for the register-with-questionnaire operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterWithQuestionnaire {
    pub display_name: DisplayName,
    pub questionnaire: Questionnaire,
}
