//! Slot generation configuration.

use serde::{Deserialize, Serialize};

/// Settings that shape how calendar days turn into slot timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Fixed offset of the venue's wall clock from UTC, in minutes.
    ///
    /// Slot start/end times given as `HH:MM` are interpreted in this offset.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Longest date range a single generation request may cover.
    #[serde(default = "default_max_range_days")]
    pub max_range_days: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            max_range_days: default_max_range_days(),
        }
    }
}

fn default_max_range_days() -> u32 {
    366
}
