//! Pricing rule entities.

pub mod model;

pub use model::{CreatePrice, Price, Quote, UpdatePrice, select_rule};
