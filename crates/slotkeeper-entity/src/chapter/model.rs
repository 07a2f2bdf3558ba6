//! Chapter entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slotkeeper_core::types::{ChapterId, ScenarioId};
use slotkeeper_core::{AppError, AppResult};
use sqlx::FromRow;

use super::difficulty::Difficulty;

/// A bookable variant of a scenario with its own capacity and duration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Unique chapter identifier.
    pub id: ChapterId,
    /// Owning scenario.
    pub scenario_id: ScenarioId,
    /// Display name.
    pub name: String,
    /// Smallest accepted party.
    pub min_player_number: i32,
    /// Largest accepted party.
    pub max_player_number: i32,
    /// Session length in minutes.
    pub duration_minutes: i32,
    /// Difficulty rating.
    pub difficulty: Difficulty,
    /// Share of teams that finish, 0-100.
    pub percentage_of_success: Option<i32>,
    /// Long description.
    pub description: Option<String>,
    /// Venue or room.
    pub place: Option<String>,
    /// Image reference (URL or storage key).
    pub image: Option<String>,
    /// Video reference (URL or storage key).
    pub video: Option<String>,
    /// When the chapter was created.
    pub created_at: DateTime<Utc>,
    /// When the chapter was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    /// Check whether a party of `size` players may book this chapter.
    pub fn accepts_party(&self, size: i32) -> bool {
        size >= 1 && size >= self.min_player_number && size <= self.max_player_number
    }

    /// Apply a partial update and re-check the chapter's invariants.
    pub fn apply(&mut self, update: UpdateChapter, now: DateTime<Utc>) -> AppResult<()> {
        if let Some(v) = update.scenario_id {
            self.scenario_id = v;
        }
        if let Some(v) = update.name {
            self.name = v;
        }
        if let Some(v) = update.min_player_number {
            self.min_player_number = v;
        }
        if let Some(v) = update.max_player_number {
            self.max_player_number = v;
        }
        if let Some(v) = update.duration_minutes {
            self.duration_minutes = v;
        }
        if let Some(v) = update.difficulty {
            self.difficulty = v;
        }
        if update.percentage_of_success.is_some() {
            self.percentage_of_success = update.percentage_of_success;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if update.place.is_some() {
            self.place = update.place;
        }
        if update.image.is_some() {
            self.image = update.image;
        }
        if update.video.is_some() {
            self.video = update.video;
        }
        self.updated_at = now;
        validate_bounds(
            &self.name,
            self.min_player_number,
            self.max_player_number,
            self.duration_minutes,
            self.percentage_of_success,
        )
    }
}

/// Data required to create a chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChapter {
    /// Owning scenario.
    pub scenario_id: ScenarioId,
    /// Display name.
    pub name: String,
    /// Smallest accepted party.
    pub min_player_number: i32,
    /// Largest accepted party.
    pub max_player_number: i32,
    /// Session length in minutes.
    pub duration_minutes: i32,
    /// Difficulty rating.
    pub difficulty: Difficulty,
    /// Share of teams that finish, 0-100.
    pub percentage_of_success: Option<i32>,
    /// Long description.
    pub description: Option<String>,
    /// Venue or room.
    pub place: Option<String>,
    /// Image reference.
    pub image: Option<String>,
    /// Video reference.
    pub video: Option<String>,
}

impl CreateChapter {
    /// Check field-level and cross-field constraints.
    pub fn validate(&self) -> AppResult<()> {
        validate_bounds(
            &self.name,
            self.min_player_number,
            self.max_player_number,
            self.duration_minutes,
            self.percentage_of_success,
        )
    }
}

/// Partial update of a chapter. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateChapter {
    /// New owning scenario.
    pub scenario_id: Option<ScenarioId>,
    /// New display name.
    pub name: Option<String>,
    /// New lower party bound.
    pub min_player_number: Option<i32>,
    /// New upper party bound.
    pub max_player_number: Option<i32>,
    /// New duration.
    pub duration_minutes: Option<i32>,
    /// New difficulty.
    pub difficulty: Option<Difficulty>,
    /// New success percentage.
    pub percentage_of_success: Option<i32>,
    /// New description.
    pub description: Option<String>,
    /// New venue.
    pub place: Option<String>,
    /// New image reference.
    pub image: Option<String>,
    /// New video reference.
    pub video: Option<String>,
}

fn validate_bounds(
    name: &str,
    min_players: i32,
    max_players: i32,
    duration_minutes: i32,
    percentage: Option<i32>,
) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Chapter name is required"));
    }
    if min_players < 1 {
        return Err(AppError::validation(
            "Minimum player number must be at least 1",
        ));
    }
    if min_players > max_players {
        return Err(AppError::validation(format!(
            "Minimum player number ({min_players}) exceeds maximum ({max_players})"
        )));
    }
    if duration_minutes < 1 {
        return Err(AppError::validation("Duration must be at least one minute"));
    }
    if let Some(p) = percentage
        && !(0..=100).contains(&p)
    {
        return Err(AppError::validation(format!(
            "Percentage of success must be between 0 and 100, got {p}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> CreateChapter {
        CreateChapter {
            scenario_id: ScenarioId::new(),
            name: "The Vault".into(),
            min_player_number: 2,
            max_player_number: 6,
            duration_minutes: 60,
            difficulty: Difficulty::Medium,
            percentage_of_success: Some(40),
            description: None,
            place: None,
            image: None,
            video: None,
        }
    }

    #[test]
    fn test_valid_chapter() {
        assert!(create().validate().is_ok());
    }

    #[test]
    fn test_min_above_max_rejected() {
        let mut c = create();
        c.min_player_number = 7;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_percentage_range() {
        let mut c = create();
        c.percentage_of_success = Some(101);
        assert!(c.validate().is_err());
        c.percentage_of_success = None;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut c = create();
        c.name = "   ".into();
        assert!(c.validate().is_err());
    }
}
