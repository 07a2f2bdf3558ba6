//! # slotkeeper-api
//!
//! HTTP API layer for Slotkeeper built on Axum.
//!
//! Provides the REST endpoints for time slots, reservations, catalog,
//! notifications and health, plus middleware (logging, CORS, compression,
//! timeout), extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::ApiError;
pub use state::AppState;
