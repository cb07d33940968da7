//! Range-sensor bank trait and shared sensor types

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::timer::{Channel, TimerId};

/// Index of a registered rangefinder within its bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorId(pub u8);

/// Errors from range-sensor operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// A measurement cycle is in flight or an unconsumed reading is
    /// pending; the trigger was refused.
    Busy,
    /// The sensor id does not name a registered sensor.
    Unknown,
    /// The sensor registry is at capacity.
    RegistryFull,
}

/// Navigation-facing interface of the ultrasonic sensor bank.
pub trait RangeSensors {
    /// Emit a trigger pulse, starting a new echo cycle.
    fn trigger(&mut self, sensor: SensorId) -> Result<(), SensorError>;

    /// True when a complete, unconsumed reading is available.
    fn is_ready(&self, sensor: SensorId) -> bool;

    /// Consume the pending reading, in centimeters. Returns `None` when
    /// no reading is ready; a reading may only be fetched once.
    fn take_distance_cm(&mut self, sensor: SensorId) -> Option<f32>;

    /// Whether `sensor` names a registered sensor.
    fn contains(&self, sensor: SensorId) -> bool;

    /// Input-capture interrupt entry point. Fans out to every registered
    /// sensor whose echo timer and channel match.
    fn on_capture(&mut self, timer: TimerId, channel: Channel);
}
