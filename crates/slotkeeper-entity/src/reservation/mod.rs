//! Reservation domain entities.

pub mod language;
pub mod model;
pub mod status;

pub use language::Language;
pub use model::{NewReservation, Reservation, ReservationFilter, StatusSummary};
pub use status::ReservationStatus;
