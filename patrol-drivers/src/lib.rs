//! Driver implementations for the Patrol rover motion core
//!
//! This crate provides concrete implementations of the traits defined
//! in patrol-core:
//!
//! - Dual 28BYJ-48 stepper bank paced by one shared periodic timer
//! - HC-SR04 ultrasonic rangefinder bank using input-capture edge timing
//!
//! Everything here is hardware-free and host-testable; the actual timer
//! and GPIO peripherals arrive through the patrol-core trait seams.

#![no_std]
#![deny(unsafe_code)]

pub mod stepper;
pub mod ultrasonic;
