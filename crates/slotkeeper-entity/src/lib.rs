//! # slotkeeper-entity
//!
//! Domain entity models for Slotkeeper. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities additionally derive `sqlx::FromRow`.
//!
//! The `slot::calendar` module holds the pure calendar arithmetic that turns
//! a date range and daily windows into concrete slot intervals.

pub mod chapter;
pub mod notification;
pub mod price;
pub mod reservation;
pub mod scenario;
pub mod slot;
pub mod user;
