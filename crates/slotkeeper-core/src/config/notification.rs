//! Reservation notification configuration.

use serde::{Deserialize, Serialize};

/// Settings for the reservation event channel and its persisted feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Buffer size of the in-process broadcast channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Whether reservation events are stored as admin notifications.
    #[serde(default = "default_persist")]
    pub persist: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            persist: default_persist(),
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}

fn default_persist() -> bool {
    true
}
