//! Reservation event broadcast and the admin notification feed.

pub mod publisher;
pub mod service;

pub use publisher::EventPublisher;
pub use service::NotificationService;
