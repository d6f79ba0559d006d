//! Achievement families, progress outcomes and challenge activity shapes.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::CardioKind;

/// Named category of progress counters. At most one definition per family is
/// active for a user at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementFamily {
    Running,
    Cycling,
    Swimming,
    Walking,
    Rowing,
    Calorie,
    Steps,
    Cook,
    Strength,
}

impl AchievementFamily {
    /// Stable tag stored alongside achievement definitions.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Cycling => "CYCLING",
            Self::Swimming => "SWIMMING",
            Self::Walking => "WALKING",
            Self::Rowing => "ROWING",
            Self::Calorie => "CALORIE",
            Self::Steps => "STEPS",
            Self::Cook => "COOK",
            Self::Strength => "STRENGTH",
        }
    }

    /// Cardio-type family fed by sessions of `kind`.
    pub fn for_cardio(kind: CardioKind) -> Self {
        match kind {
            CardioKind::Running => Self::Running,
            CardioKind::Cycling => Self::Cycling,
            CardioKind::Swimming => Self::Swimming,
            CardioKind::Walking => Self::Walking,
            CardioKind::Rowing => Self::Rowing,
        }
    }
}

impl fmt::Display for AchievementFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Badge awarded when a definition's threshold is crossed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadge {
    pub name: String,
    pub image: String,
    pub generative_text: String,
    pub threshold: f64,
}

/// Result of resolving and incrementing one achievement family.
///
/// `achievement_name == None` means the user has no active achievement in the
/// family; it is a valid terminal state, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementProgress {
    pub achievement_name: Option<String>,
    pub crossed_threshold: bool,
    pub earned_badge: Option<EarnedBadge>,
}

impl AchievementProgress {
    /// Outcome for a family with no active achievement.
    pub fn none() -> Self {
        Self::default()
    }

    /// Outcome for an increment that did not cross the threshold.
    pub fn progressed(achievement_name: impl Into<String>) -> Self {
        Self {
            achievement_name: Some(achievement_name.into()),
            crossed_threshold: false,
            earned_badge: None,
        }
    }

    /// Outcome for an increment that earned `badge`.
    pub fn earned(achievement_name: impl Into<String>, badge: EarnedBadge) -> Self {
        Self {
            achievement_name: Some(achievement_name.into()),
            crossed_threshold: true,
            earned_badge: Some(badge),
        }
    }
}

/// Activity categories tracked by challenge badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Cardio(CardioKind),
    Steps,
    Meal,
    Training,
}

/// Shape of one activity, as seen by the challenge-badge track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityShape {
    pub kind: ActivityKind,
    pub date: NaiveDate,
    pub quantity: f64,
}
