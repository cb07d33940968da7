//! Stepper coil output abstraction

/// The four coil-control outputs of one stepper motor.
///
/// Bit `n` of the pattern drives coil `n`; an all-zero pattern
/// de-energizes the motor.
pub trait CoilOutputs {
    /// Drive the four coil pins with a 4-bit energization pattern.
    fn set_pattern(&mut self, pattern: u8);
}
