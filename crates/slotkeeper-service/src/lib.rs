//! # slotkeeper-service
//!
//! Business logic service layer for Slotkeeper. Each service orchestrates
//! the storage traits and the RBAC enforcer to implement one admin use
//! case.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references, so the same service runs
//! against PostgreSQL or the in-memory store.

pub mod bulk;
pub mod catalog;
pub mod context;
pub mod notification;
pub mod reservation;
pub mod slot;

pub use bulk::{BulkAction, BulkItem, BulkReport, BulkService};
pub use catalog::CatalogService;
pub use context::RequestContext;
pub use notification::{EventPublisher, NotificationService};
pub use reservation::ReservationService;
pub use slot::{AvailabilityService, GenerateSlots, GenerationReport, SlotGeneratorService};

#[cfg(test)]
pub(crate) mod test_support;
