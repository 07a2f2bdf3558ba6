//! Time slot generation and availability management.

pub mod availability;
pub mod generator;

pub use availability::AvailabilityService;
pub use generator::{GenerateSlots, GenerationReport, SlotGeneratorService};
