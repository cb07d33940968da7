//! Navigation configuration types

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default obstacle threshold in centimeters.
pub const DEFAULT_THRESHOLD_CM: f32 = 20.0;

/// Default (and minimum) spacing between trigger pulses in milliseconds.
///
/// The HC-SR04 needs time to recover between measurement cycles; a zero
/// interval in a supplied configuration is replaced by this value.
pub const DEFAULT_TRIGGER_INTERVAL_MS: u32 = 60;

/// Minimum interval between re-announcements of an unchanged command.
pub const DEFAULT_ANNOUNCE_INTERVAL_MS: u32 = 1000;

/// Navigation controller configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavConfig {
    /// Distances below this are treated as an obstacle (cm).
    pub threshold_cm: f32,
    /// Minimum spacing between successive trigger pulses (ms).
    pub trigger_interval_ms: u32,
    /// Minimum spacing between re-announcements of an unchanged command (ms).
    pub announce_interval_ms: u32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            threshold_cm: DEFAULT_THRESHOLD_CM,
            trigger_interval_ms: DEFAULT_TRIGGER_INTERVAL_MS,
            announce_interval_ms: DEFAULT_ANNOUNCE_INTERVAL_MS,
        }
    }
}

impl NavConfig {
    /// Replace a zero trigger interval with the default minimum.
    pub fn sanitized(mut self) -> Self {
        if self.trigger_interval_ms == 0 {
            self.trigger_interval_ms = DEFAULT_TRIGGER_INTERVAL_MS;
        }
        self
    }
}
