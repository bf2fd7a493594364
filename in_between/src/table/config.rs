//! Table client tunables.

use std::time::Duration;

use crate::game::layout::TableGeometry;

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    /// How many times to re-check for private hands when a turn starts
    /// before they have arrived (default: 5)
    pub hands_retry_attempts: u8,

    /// Delay between those checks (default: 1s)
    pub hands_retry_delay: Duration,

    /// Countdown refresh period (default: 1s)
    pub tick_interval: Duration,

    /// Session keep-alive period while the board is open (default: 15s)
    pub ping_interval: Duration,

    /// Capacity of the command inbox
    pub command_capacity: usize,

    /// Capacity of the notice channel; notices beyond it are dropped
    pub notice_capacity: usize,

    /// Dimensions seat anchors are computed for
    pub geometry: TableGeometry,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            hands_retry_attempts: 5,
            hands_retry_delay: Duration::from_secs(1),
            tick_interval: Duration::from_secs(1),
            ping_interval: Duration::from_secs(15),
            command_capacity: 32,
            notice_capacity: 64,
            geometry: TableGeometry::default(),
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval.is_zero() {
            return Err("Tick interval must be greater than zero".to_string());
        }

        if self.ping_interval.is_zero() {
            return Err("Ping interval must be greater than zero".to_string());
        }

        if self.hands_retry_delay.is_zero() && self.hands_retry_attempts > 0 {
            return Err("Hands retry delay must be greater than zero".to_string());
        }

        if self.command_capacity == 0 || self.notice_capacity == 0 {
            return Err("Channel capacities must be greater than zero".to_string());
        }

        if self.geometry.width <= 0.0 || self.geometry.height <= 0.0 {
            return Err("Table geometry must have a positive size".to_string());
        }

        Ok(())
    }
}
