//! Reservation lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ChapterId, ReservationId, TimeSlotId};

/// Events emitted when a reservation is created or changes bucket.
///
/// Statuses are carried as their wire names (`pending`, `approved`,
/// `declined`, `deleted`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReservationEvent {
    /// A new reservation entered the pending bucket.
    Created {
        /// Reservation ID.
        reservation_id: ReservationId,
        /// Booked chapter.
        chapter_id: ChapterId,
        /// Bound slot.
        time_slot_id: TimeSlotId,
        /// Contact name.
        name: String,
        /// Number of players.
        party_size: i32,
        /// Slot start.
        starts_at: DateTime<Utc>,
    },
    /// A reservation moved from one status to another.
    StatusChanged {
        /// Reservation ID.
        reservation_id: ReservationId,
        /// Contact name.
        name: String,
        /// Previous status.
        from: String,
        /// New status.
        to: String,
    },
}

impl ReservationEvent {
    /// The reservation this event is about.
    pub fn reservation_id(&self) -> ReservationId {
        match self {
            Self::Created { reservation_id, .. } | Self::StatusChanged { reservation_id, .. } => {
                *reservation_id
            }
        }
    }

    /// Short human-readable title for the admin notification feed.
    pub fn title(&self) -> String {
        match self {
            Self::Created { .. } => "New reservation".to_string(),
            Self::StatusChanged { to, .. } => format!("Reservation {to}"),
        }
    }

    /// Notification body text.
    pub fn message(&self) -> String {
        match self {
            Self::Created {
                name,
                party_size,
                starts_at,
                ..
            } => format!(
                "{name} booked for {party_size} player(s) at {}",
                starts_at.format("%Y-%m-%d %H:%M UTC")
            ),
            Self::StatusChanged { name, from, to, .. } => {
                format!("Reservation for {name} moved from {from} to {to}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_changed_text() {
        let event = ReservationEvent::StatusChanged {
            reservation_id: ReservationId::new(),
            name: "Ada".into(),
            from: "pending".into(),
            to: "approved".into(),
        };
        assert_eq!(event.title(), "Reservation approved");
        assert_eq!(
            event.message(),
            "Reservation for Ada moved from pending to approved"
        );
    }

    #[test]
    fn test_tagged_serialization() {
        let event = ReservationEvent::StatusChanged {
            reservation_id: ReservationId::new(),
            name: "Ada".into(),
            from: "pending".into(),
            to: "declined".into(),
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["type"], "status_changed");
    }
}
