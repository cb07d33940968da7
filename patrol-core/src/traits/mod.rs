//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic,
//! the driver implementations, and hardware-specific code.

pub mod clock;
pub mod coils;
pub mod drive;
pub mod range;
pub mod timer;

pub use clock::Clock;
pub use coils::CoilOutputs;
pub use drive::{Direction, DriveMotors, MotorError, MotorId};
pub use range::{RangeSensors, SensorError, SensorId};
pub use timer::{
    CaptureChannel, Channel, EdgePolarity, StepTimer, TimerConfigError, TimerId, TriggerPulse,
};
