//! Time slot domain entities and calendar expansion.

pub mod calendar;
pub mod model;

pub use calendar::{DailyWindows, DateRange, PlanVerdict, SlotPlan, TimeWindow, classify, expand};
pub use model::{NewTimeSlot, TimeSlot};
