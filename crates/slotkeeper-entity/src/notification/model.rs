//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slotkeeper_core::events::ReservationEvent;
use slotkeeper_core::types::{NotificationId, ReservationId};
use sqlx::FromRow;

/// An entry in the admin notification feed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// Reservation the notification is about, if it still exists.
    pub reservation_id: Option<ReservationId>,
    /// Event type that triggered this notification.
    pub event_type: String,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Whether an admin has read this notification.
    pub is_read: bool,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build an unread notification from a reservation event.
    pub fn from_event(event: &ReservationEvent, now: DateTime<Utc>) -> Self {
        let event_type = match event {
            ReservationEvent::Created { .. } => "reservation_created",
            ReservationEvent::StatusChanged { .. } => "reservation_status_changed",
        };
        Self {
            id: NotificationId::new(),
            reservation_id: Some(event.reservation_id()),
            event_type: event_type.to_string(),
            title: event.title(),
            message: event.message(),
            is_read: false,
            read_at: None,
            created_at: now,
        }
    }
}
