//! GPIO-backed coil outputs
//!
//! Adapts four `embedded-hal` output pins to the [`CoilOutputs`] trait.

use embedded_hal::digital::{OutputPin, PinState};
use patrol_core::traits::CoilOutputs;

/// Four coil-control pins of one 28BYJ-48 driven through a ULN2003-style
/// driver board. Bit `n` of the pattern drives pin `n`.
///
/// Pin errors are discarded: on the target class of device the coil pins
/// are plain push-pull GPIOs whose writes cannot fail.
#[derive(Debug)]
pub struct GpioCoils<P> {
    pins: [P; 4],
}

impl<P: OutputPin> GpioCoils<P> {
    pub fn new(coil1: P, coil2: P, coil3: P, coil4: P) -> Self {
        Self {
            pins: [coil1, coil2, coil3, coil4],
        }
    }

    /// Give the pins back, e.g. to repurpose them after a shutdown.
    pub fn release(self) -> [P; 4] {
        self.pins
    }
}

impl<P: OutputPin> CoilOutputs for GpioCoils<P> {
    fn set_pattern(&mut self, pattern: u8) {
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            let level = PinState::from(pattern & (1 << bit) != 0);
            let _ = pin.set_state(level);
        }
    }
}
