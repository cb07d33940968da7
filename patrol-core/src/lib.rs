//! Board-agnostic motion and obstacle-avoidance logic for the Patrol rover
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (step timer, input capture, coil outputs)
//! - Driver-facing traits for the motor and range-sensor banks
//! - Obstacle-avoidance navigation state machine
//! - Configuration type definitions
//!
//! Concrete driver implementations live in `patrol-drivers`; the enclosing
//! firmware owns the peripherals and interrupt vectors and reaches this
//! code through the trait seams defined here.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod nav;
pub mod traits;
