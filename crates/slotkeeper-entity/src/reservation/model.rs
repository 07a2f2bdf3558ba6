//! Reservation entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use slotkeeper_core::types::{ChapterId, ReservationId, ScenarioId, TimeSlotId};
use slotkeeper_core::{AppError, AppResult};
use sqlx::FromRow;

use super::language::Language;
use crate::slot::TimeSlot;
use super::status::ReservationStatus;

/// A customer's booking bound to one time slot.
///
/// `slot_date`/`slot_start`/`slot_end` are copied from the slot at booking time so the
/// reservation stays readable after the slot is deleted, at which point
/// `time_slot_id` becomes `None`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: ReservationId,
    /// Scenario of the booked chapter.
    pub scenario_id: ScenarioId,
    /// Booked chapter.
    pub chapter_id: ChapterId,
    /// Bound slot, if it still exists.
    pub time_slot_id: Option<TimeSlotId>,
    /// Contact name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone, including country code.
    pub phone: String,
    /// Party size.
    pub people: i32,
    /// Session language.
    pub language: Language,
    /// Current bucket.
    pub status: ReservationStatus,
    /// Local calendar date of the slot at booking time.
    pub slot_date: NaiveDate,
    /// Slot start at booking time.
    pub slot_start: DateTime<Utc>,
    /// Slot end at booking time.
    pub slot_end: DateTime<Utc>,
    /// When the reservation was created.
    pub created_at: DateTime<Utc>,
    /// When the reservation was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Build a pending reservation bound to `slot`.
    pub fn pending(
        new: NewReservation,
        scenario_id: ScenarioId,
        slot: &TimeSlot,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ReservationId::new(),
            scenario_id,
            chapter_id: new.chapter_id,
            time_slot_id: Some(slot.id),
            name: new.name,
            email: new.email,
            phone: new.phone,
            people: new.people,
            language: new.language,
            status: ReservationStatus::Pending,
            slot_date: slot.date,
            slot_start: slot.start_time,
            slot_end: slot.end_time,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the reservation currently keeps its slot unavailable.
    pub fn is_active(&self) -> bool {
        self.status.holds_slot() && self.time_slot_id.is_some()
    }
}

/// Data required to create a reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReservation {
    /// Chapter being booked.
    pub chapter_id: ChapterId,
    /// Slot being booked.
    pub time_slot_id: TimeSlotId,
    /// Contact name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Party size.
    pub people: i32,
    /// Session language.
    pub language: Language,
}

impl NewReservation {
    /// Check contact fields and the party size lower bound.
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        if !self.email.contains('@') {
            return Err(AppError::validation(format!(
                "Invalid email address: '{}'",
                self.email
            )));
        }
        let digits = self.phone.chars().filter(|c| c.is_ascii_digit()).count();
        if digits < 6 {
            return Err(AppError::validation(format!(
                "Invalid phone number: '{}'",
                self.phone
            )));
        }
        if self.people < 1 {
            return Err(AppError::validation("Party size must be at least 1"));
        }
        Ok(())
    }
}

/// Criteria for listing reservations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationFilter {
    /// Only this bucket.
    pub status: Option<ReservationStatus>,
    /// Only reservations whose slot falls on this local date.
    pub date: Option<NaiveDate>,
    /// Only this chapter.
    pub chapter_id: Option<ChapterId>,
    /// Only this scenario.
    pub scenario_id: Option<ScenarioId>,
    /// Only this language.
    pub language: Option<Language>,
    /// Case-insensitive substring of name or email.
    pub search: Option<String>,
}

impl ReservationFilter {
    /// In-process evaluation of the filter.
    pub fn matches(&self, r: &Reservation) -> bool {
        if self.status.is_some_and(|s| s != r.status) {
            return false;
        }
        if self.date.is_some_and(|d| d != r.slot_date) {
            return false;
        }
        if self.chapter_id.is_some_and(|c| c != r.chapter_id) {
            return false;
        }
        if self.scenario_id.is_some_and(|s| s != r.scenario_id) {
            return false;
        }
        if self.language.is_some_and(|l| l != r.language) {
            return false;
        }
        if let Some(needle) = self.search.as_deref().map(str::to_lowercase)
            && !needle.is_empty()
            && !r.name.to_lowercase().contains(&needle)
            && !r.email.to_lowercase().contains(&needle)
        {
            return false;
        }
        true
    }

    /// The `ILIKE` pattern for the search term, if any.
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
    }
}

/// Number of reservations per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    /// Pending count.
    pub pending: u64,
    /// Approved count.
    pub approved: u64,
    /// Declined count.
    pub declined: u64,
    /// Deleted count.
    pub deleted: u64,
}

impl StatusSummary {
    /// Add `count` to the bucket for `status`.
    pub fn add(&mut self, status: ReservationStatus, count: u64) {
        match status {
            ReservationStatus::Pending => self.pending += count,
            ReservationStatus::Approved => self.approved += count,
            ReservationStatus::Declined => self.declined += count,
            ReservationStatus::Deleted => self.deleted += count,
        }
    }

    /// Total across buckets.
    pub fn total(&self) -> u64 {
        self.pending + self.approved + self.declined + self.deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::NewTimeSlot;
    use chrono::TimeZone;

    fn new_reservation() -> NewReservation {
        NewReservation {
            chapter_id: ChapterId::new(),
            time_slot_id: TimeSlotId::new(),
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "+33 6 12 34 56 78".into(),
            people: 3,
            language: Language::En,
        }
    }

    fn reservation() -> Reservation {
        let new = new_reservation();
        let slot = TimeSlot::new(
            NewTimeSlot {
                chapter_id: new.chapter_id,
                date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
                start_time: Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap(),
                end_time: Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap(),
            },
            Utc::now(),
        );
        Reservation::pending(new, ScenarioId::new(), &slot, Utc::now())
    }

    #[test]
    fn test_validate_contact() {
        assert!(new_reservation().validate().is_ok());

        let mut r = new_reservation();
        r.email = "nope".into();
        assert!(r.validate().is_err());

        let mut r = new_reservation();
        r.people = 0;
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_pending_holds_slot() {
        let r = reservation();
        assert_eq!(r.status, ReservationStatus::Pending);
        assert!(r.is_active());
    }

    #[test]
    fn test_filter_search_is_case_insensitive() {
        let r = reservation();
        let filter = ReservationFilter {
            search: Some("LOVELACE".into()),
            ..Default::default()
        };
        assert!(filter.matches(&r));

        let filter = ReservationFilter {
            search: Some("grace".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&r));
    }

    #[test]
    fn test_filter_by_date_and_status() {
        let r = reservation();
        let filter = ReservationFilter {
            status: Some(ReservationStatus::Pending),
            date: NaiveDate::from_ymd_opt(2025, 1, 6),
            ..Default::default()
        };
        assert!(filter.matches(&r));

        let filter = ReservationFilter {
            status: Some(ReservationStatus::Approved),
            ..Default::default()
        };
        assert!(!filter.matches(&r));
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let filter = ReservationFilter {
            search: Some("50%_off".into()),
            ..Default::default()
        };
        assert_eq!(filter.search_pattern().as_deref(), Some("%50\\%\\_off%"));
    }
}
