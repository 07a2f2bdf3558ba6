//! Domain events emitted by Slotkeeper operations.
//!
//! Events are dispatched through the in-process broadcast channel and
//! consumed by the notification feed and any external push collaborator.

pub mod reservation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use reservation::ReservationEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Subject of the token that caused the event, `None` for public bookings.
    pub actor: Option<String>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A reservation-related event.
    Reservation(ReservationEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor: Option<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor,
            payload,
        }
    }

    /// Shorthand for a reservation event.
    pub fn reservation(actor: Option<String>, event: ReservationEvent) -> Self {
        Self::new(actor, EventPayload::Reservation(event))
    }
}
