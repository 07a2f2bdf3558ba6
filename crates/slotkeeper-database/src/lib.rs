//! # slotkeeper-database
//!
//! Storage for Slotkeeper. The [`store`] module defines the storage traits
//! the services are written against; [`repositories`] implements them on
//! PostgreSQL and [`store::memory`] implements them in process.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::Stores;
