//! Motor-bank trait and shared motor types
//!
//! [`DriveMotors`] is the face of the stepper driver that the navigation
//! controller sees. The concrete implementation (registration, speed
//! presets, the half-step sequence) lives in `patrol-drivers`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::timer::{TimerConfigError, TimerId};

/// The two motor slots of the differential drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MotorId {
    /// Left wheel, slot 0.
    Left,
    /// Right wheel, slot 1.
    Right,
}

impl MotorId {
    /// Registry slot index.
    pub fn index(self) -> usize {
        match self {
            MotorId::Left => 0,
            MotorId::Right => 1,
        }
    }
}

/// Stepping direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    /// Signed step-index offset: +1 forward, -1 reverse.
    pub fn offset(self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }
}

/// Errors from motor-bank operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// The motor slot has not been registered.
    NotRegistered,
    /// No stepping timer has been bound to the bank yet.
    NoTimer,
    /// Registration presented a timer instance different from the one
    /// already shared by the bank.
    SharedTimerMismatch,
    /// A move of zero steps was requested.
    ZeroSteps,
    /// The operation is not allowed while a motor is stepping.
    Busy,
    /// The stepping timer rejected a base reconfiguration.
    Timer(TimerConfigError),
}

/// Navigation-facing interface of the dual-motor stepper bank.
pub trait DriveMotors {
    /// Schedule `steps` interrupt-paced half-steps on one motor and make
    /// sure the shared stepping timer is running.
    fn move_steps(&mut self, motor: MotorId, steps: u16, direction: Direction)
        -> Result<(), MotorError>;

    /// Cancel any pending steps on one motor and de-energize its coils.
    fn stop(&mut self, motor: MotorId) -> Result<(), MotorError>;

    /// True while the motor has steps left to execute.
    fn is_busy(&self, motor: MotorId) -> bool;

    /// Periodic-timer interrupt entry point. Ignored unless `timer`
    /// matches the bank's shared stepping timer.
    fn on_timer_tick(&mut self, timer: TimerId);
}
