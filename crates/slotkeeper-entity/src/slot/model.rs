//! Time slot entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use slotkeeper_core::types::{ChapterId, TimeSlotId};
use sqlx::FromRow;

/// A concrete bookable interval of one chapter on one date.
///
/// `is_available` is cleared while a reservation holds the slot and
/// `is_disabled` is an admin block that exists independently of bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// Unique slot identifier.
    pub id: TimeSlotId,
    /// Owning chapter.
    pub chapter_id: ChapterId,
    /// Local calendar date of the slot.
    pub date: NaiveDate,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant (exclusive).
    pub end_time: DateTime<Utc>,
    /// Whether no reservation holds the slot.
    pub is_available: bool,
    /// Whether an admin blocked the slot.
    pub is_disabled: bool,
    /// When the slot was created.
    pub created_at: DateTime<Utc>,
    /// When the slot was last updated.
    pub updated_at: DateTime<Utc>,
}

impl TimeSlot {
    /// Build a fresh, available slot from a plan.
    pub fn new(new: NewTimeSlot, now: DateTime<Utc>) -> Self {
        Self {
            id: TimeSlotId::new(),
            chapter_id: new.chapter_id,
            date: new.date,
            start_time: new.start_time,
            end_time: new.end_time,
            is_available: true,
            is_disabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// A slot can take a new reservation only when it is free and not blocked.
    pub fn is_bookable(&self) -> bool {
        self.is_available && !self.is_disabled
    }

    /// Half-open interval overlap test against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time
    }

    /// Length of the slot in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// Data required to insert a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTimeSlot {
    /// Owning chapter.
    pub chapter_id: ChapterId,
    /// Local calendar date.
    pub date: NaiveDate,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant.
    pub end_time: DateTime<Utc>,
}
