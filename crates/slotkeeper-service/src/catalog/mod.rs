//! Scenario, chapter and price management.

pub mod service;

pub use service::CatalogService;
