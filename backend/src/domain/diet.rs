//! Published meals.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::UserId;

/// Command for the publish-meal operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishMeal {
    pub meal_id: Uuid,
    pub name: String,
    pub calories: f64,
    pub ingredients: Vec<String>,
}

/// Meal document as stored once published.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMeal {
    pub id: Uuid,
    pub author: UserId,
    pub name: String,
    pub calories: f64,
    pub ingredients: Vec<String>,
    pub published_at: DateTime<Utc>,
}
