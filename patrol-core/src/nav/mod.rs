//! Obstacle-avoidance navigation
//!
//! The navigation controller alternately measures the right and left
//! rangefinders, evaluates the obstacle-avoidance decision rule, and
//! issues differential-step motion commands to the motor bank.

pub mod decision;
pub mod rover;

pub use decision::{decide, RouteCommand};
pub use rover::{NavError, RouteState, Rover};
