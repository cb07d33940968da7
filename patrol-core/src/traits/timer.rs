//! Timer peripheral abstractions
//!
//! The drivers never touch timer registers directly. Instead the firmware
//! hands them implementations of these traits, and interrupt dispatch is
//! done by comparing [`TimerId`] values rather than raw handle pointers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identity of one hardware timer instance.
///
/// Two handles that refer to the same physical timer must report the same
/// id; this is how the drivers detect which instance fired an interrupt
/// and enforce the shared-stepping-timer invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimerId(pub u8);

/// Capture/compare channel of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Channel {
    Ch1,
    Ch2,
    Ch3,
    Ch4,
}

/// Edge polarity for input capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgePolarity {
    Rising,
    Falling,
}

/// Errors from reconfiguring a timer's base parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerConfigError {
    /// The timer peripheral rejected the new base configuration.
    Rejected,
}

/// The shared periodic stepping timer.
///
/// One instance drives every registered stepper motor; its overflow
/// interrupt paces the half-step sequence.
pub trait StepTimer {
    /// Identity of the underlying timer instance.
    fn id(&self) -> TimerId;

    /// Start the periodic overflow interrupt. Idempotent: starting an
    /// already-running timer is a no-op.
    fn start_interrupt(&mut self);

    /// Stop the periodic overflow interrupt.
    fn stop_interrupt(&mut self);

    /// Reconfigure the timer base (prescaler and auto-reload period).
    ///
    /// Only called while the interrupt is stopped and no motor is busy.
    fn apply_base(&mut self, prescaler: u32, period: u32) -> Result<(), TimerConfigError>;
}

/// One input-capture channel used for echo edge timing.
pub trait CaptureChannel {
    /// Identity of the timer instance this channel belongs to.
    fn timer_id(&self) -> TimerId;

    /// Which channel of that timer this is.
    fn channel(&self) -> Channel;

    /// The counter value latched by the most recent capture event.
    fn captured(&self) -> u16;

    /// Reconfigure the capture polarity and re-enable the capture
    /// interrupt, in that order. The polarity change must be complete
    /// before the interrupt is re-armed or the next edge can be missed.
    fn arm(&mut self, polarity: EdgePolarity);
}

/// Pulse-output channel that emits the rangefinder's trigger pulse.
pub trait TriggerPulse {
    /// Restart the pulse generator from a zeroed counter so that exactly
    /// one trigger pulse of the configured width is emitted.
    fn fire(&mut self);
}
