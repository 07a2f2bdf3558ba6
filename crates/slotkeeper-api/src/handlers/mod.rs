//! Route handlers organized by domain.

pub mod catalog;
pub mod health;
pub mod notification;
pub mod reservation;
pub mod slot;
