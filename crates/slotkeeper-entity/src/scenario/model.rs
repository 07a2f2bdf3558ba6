//! Scenario entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slotkeeper_core::types::ScenarioId;
use sqlx::FromRow;

/// The parent storyline a set of chapters belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Unique scenario identifier.
    pub id: ScenarioId,
    /// Display name.
    pub name: String,
    /// Free-form grouping label (e.g. "horror", "family").
    pub category: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// When the scenario was created.
    pub created_at: DateTime<Utc>,
    /// When the scenario was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScenario {
    /// Display name.
    pub name: String,
    /// Grouping label.
    pub category: Option<String>,
    /// Long description.
    pub description: Option<String>,
}

/// Partial update of a scenario. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateScenario {
    /// New display name.
    pub name: Option<String>,
    /// New grouping label.
    pub category: Option<String>,
    /// New description.
    pub description: Option<String>,
}

impl Scenario {
    /// Apply a partial update in place.
    pub fn apply(&mut self, update: UpdateScenario, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if update.category.is_some() {
            self.category = update.category;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        self.updated_at = now;
    }
}
