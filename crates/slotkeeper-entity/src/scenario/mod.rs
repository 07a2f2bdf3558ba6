//! Scenario domain entities.

pub mod model;

pub use model::{CreateScenario, Scenario, UpdateScenario};
