//! Reservation binding and status transitions.

pub mod service;

pub use service::ReservationService;
