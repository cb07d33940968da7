//! Dual 28BYJ-48 stepper bank
//!
//! Two geared unipolar steppers driven in half-step mode, both paced by a
//! single shared periodic timer. The timer's overflow interrupt advances
//! every busy motor by one half-step; the interrupt runs only while at
//! least one motor has steps remaining.

use patrol_core::traits::{
    CoilOutputs, Direction, DriveMotors, MotorError, MotorId, StepTimer, TimerId,
};

pub mod gpio;

pub use gpio::GpioCoils;

/// Half-step coil energization sequence for the 28BYJ-48, one bit per
/// coil. Two adjacent coils are energized on the transition entries,
/// which gives smoother, higher-torque motion than full stepping.
pub const HALF_STEP_SEQUENCE: [u8; 8] = [
    0b0001, 0b0011, 0b0010, 0b0110, 0b0100, 0b1100, 0b1000, 0b1001,
];

/// Half-steps per output-shaft revolution of the geared 28BYJ-48.
pub const STEPS_PER_REV: u16 = 2048;

/// Number of motor slots in the bank.
pub const MOTOR_COUNT: usize = 2;

/// Stepping-rate presets, applied as a prescaler/period pair on the
/// shared timer. A coarser prescaler means slower stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl SpeedPreset {
    /// Timer base for this preset as `(prescaler, period)`.
    pub fn timer_base(self) -> (u32, u32) {
        match self {
            SpeedPreset::Low => (16_799, 9),
            SpeedPreset::Medium => (8_399, 9),
            SpeedPreset::High => (4_199, 9),
        }
    }
}

/// Per-motor stepping state.
#[derive(Debug)]
struct MotorSlot<C> {
    coils: C,
    /// Position in [`HALF_STEP_SEQUENCE`], always in `[0, 8)`.
    step_index: u8,
    direction: Direction,
    steps_remaining: u16,
}

impl<C: CoilOutputs> MotorSlot<C> {
    fn new(mut coils: C) -> Self {
        coils.set_pattern(0);
        Self {
            coils,
            step_index: 0,
            direction: Direction::Forward,
            steps_remaining: 0,
        }
    }

    /// Advance one half-step in the current direction, wrapping the
    /// sequence index in both directions, and drive the new pattern.
    fn advance(&mut self) {
        let next = (self.step_index as i8 + self.direction.offset()).rem_euclid(8);
        self.step_index = next as u8;
        self.coils.set_pattern(HALF_STEP_SEQUENCE[self.step_index as usize]);
        self.steps_remaining -= 1;
    }
}

/// The dual-motor stepper bank.
///
/// All registered motors share exactly one stepping timer; registering a
/// motor against a different timer instance is a configuration error.
#[derive(Debug)]
pub struct StepperBank<C, T> {
    slots: [Option<MotorSlot<C>>; MOTOR_COUNT],
    timer: Option<T>,
}

impl<C, T> Default for StepperBank<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, T> StepperBank<C, T> {
    /// Create an empty bank with no motors and no timer bound.
    pub fn new() -> Self {
        Self {
            slots: [None, None],
            timer: None,
        }
    }
}

impl<C, T> StepperBank<C, T>
where
    C: CoilOutputs,
    T: StepTimer,
{
    /// Register one motor slot.
    ///
    /// The first registration binds the bank's shared stepping timer;
    /// later registrations must present a handle to the same instance,
    /// which is then dropped in favor of the one already held. Resets the
    /// slot's step state and de-energizes its coils.
    pub fn register(&mut self, motor: MotorId, timer: T, coils: C) -> Result<(), MotorError> {
        match &self.timer {
            None => self.timer = Some(timer),
            Some(bound) => {
                if bound.id() != timer.id() {
                    return Err(MotorError::SharedTimerMismatch);
                }
            }
        }

        self.slots[motor.index()] = Some(MotorSlot::new(coils));
        Ok(())
    }

    /// Schedule a move and make sure the stepping interrupt is running.
    pub fn move_steps(
        &mut self,
        motor: MotorId,
        steps: u16,
        direction: Direction,
    ) -> Result<(), MotorError> {
        if steps == 0 {
            return Err(MotorError::ZeroSteps);
        }
        let timer = self.timer.as_mut().ok_or(MotorError::NoTimer)?;
        let slot = self.slots[motor.index()]
            .as_mut()
            .ok_or(MotorError::NotRegistered)?;

        slot.direction = direction;
        slot.steps_remaining = steps;
        timer.start_interrupt();
        Ok(())
    }

    /// Cancel pending steps on one motor and de-energize its coils. The
    /// timer interrupt is stopped only if no motor remains busy.
    pub fn stop(&mut self, motor: MotorId) -> Result<(), MotorError> {
        let slot = self.slots[motor.index()]
            .as_mut()
            .ok_or(MotorError::NotRegistered)?;
        slot.steps_remaining = 0;
        slot.coils.set_pattern(0);

        if !self.any_busy() {
            if let Some(timer) = self.timer.as_mut() {
                timer.stop_interrupt();
            }
        }
        Ok(())
    }

    /// True while the motor has steps left to execute.
    pub fn is_busy(&self, motor: MotorId) -> bool {
        self.slots[motor.index()]
            .as_ref()
            .is_some_and(|slot| slot.steps_remaining > 0)
    }

    /// True while any registered motor has steps left.
    pub fn any_busy(&self) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|slot| slot.steps_remaining > 0)
    }

    /// Current half-step sequence index of a registered motor.
    pub fn step_index(&self, motor: MotorId) -> Option<u8> {
        self.slots[motor.index()].as_ref().map(|slot| slot.step_index)
    }

    /// Reconfigure the shared timer base for a new stepping rate.
    ///
    /// Refused with [`MotorError::Busy`] while any motor is stepping.
    pub fn set_speed_preset(&mut self, preset: SpeedPreset) -> Result<(), MotorError> {
        if self.any_busy() {
            return Err(MotorError::Busy);
        }
        let timer = self.timer.as_mut().ok_or(MotorError::NoTimer)?;
        let (prescaler, period) = preset.timer_base();
        timer.apply_base(prescaler, period).map_err(MotorError::Timer)
    }

    /// Periodic-timer overflow handler.
    ///
    /// Advances every busy motor by one half-step. When, after
    /// processing, no motor has steps remaining, the interrupt is stopped
    /// and the all-zero pattern is re-asserted on every registered motor.
    pub fn on_timer_tick(&mut self, timer: TimerId) {
        let Some(bound) = self.timer.as_mut() else {
            return;
        };
        if bound.id() != timer {
            return;
        }

        for slot in self.slots.iter_mut().flatten() {
            if slot.steps_remaining > 0 {
                slot.advance();
            }
        }

        let idle = self
            .slots
            .iter()
            .flatten()
            .all(|slot| slot.steps_remaining == 0);
        if idle {
            bound.stop_interrupt();
            for slot in self.slots.iter_mut().flatten() {
                slot.coils.set_pattern(0);
            }
        }
    }
}

impl<C, T> DriveMotors for StepperBank<C, T>
where
    C: CoilOutputs,
    T: StepTimer,
{
    fn move_steps(
        &mut self,
        motor: MotorId,
        steps: u16,
        direction: Direction,
    ) -> Result<(), MotorError> {
        StepperBank::move_steps(self, motor, steps, direction)
    }

    fn stop(&mut self, motor: MotorId) -> Result<(), MotorError> {
        StepperBank::stop(self, motor)
    }

    fn is_busy(&self, motor: MotorId) -> bool {
        StepperBank::is_busy(self, motor)
    }

    fn on_timer_tick(&mut self, timer: TimerId) {
        StepperBank::on_timer_tick(self, timer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use patrol_core::traits::TimerConfigError;
    use proptest::prelude::*;

    #[derive(Default)]
    struct TimerState {
        running: Cell<bool>,
        stops: Cell<u32>,
        base: Cell<Option<(u32, u32)>>,
    }

    struct FakeTimer<'a> {
        id: TimerId,
        state: &'a TimerState,
    }

    impl StepTimer for FakeTimer<'_> {
        fn id(&self) -> TimerId {
            self.id
        }

        fn start_interrupt(&mut self) {
            self.state.running.set(true);
        }

        fn stop_interrupt(&mut self) {
            self.state.running.set(false);
            self.state.stops.set(self.state.stops.get() + 1);
        }

        fn apply_base(&mut self, prescaler: u32, period: u32) -> Result<(), TimerConfigError> {
            self.state.base.set(Some((prescaler, period)));
            Ok(())
        }
    }

    struct FakeCoils<'a> {
        pattern: &'a Cell<u8>,
    }

    impl CoilOutputs for FakeCoils<'_> {
        fn set_pattern(&mut self, pattern: u8) {
            self.pattern.set(pattern);
        }
    }

    struct Rig {
        timer: TimerState,
        left: Cell<u8>,
        right: Cell<u8>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                timer: TimerState::default(),
                left: Cell::new(0xFF),
                right: Cell::new(0xFF),
            }
        }

        fn bank(&self) -> StepperBank<FakeCoils<'_>, FakeTimer<'_>> {
            let mut bank = StepperBank::new();
            bank.register(
                MotorId::Left,
                FakeTimer { id: TimerId(5), state: &self.timer },
                FakeCoils { pattern: &self.left },
            )
            .unwrap();
            bank.register(
                MotorId::Right,
                FakeTimer { id: TimerId(5), state: &self.timer },
                FakeCoils { pattern: &self.right },
            )
            .unwrap();
            bank
        }
    }

    #[test]
    fn test_register_resets_and_deenergizes() {
        let rig = Rig::new();
        let bank = rig.bank();

        assert_eq!(rig.left.get(), 0);
        assert_eq!(rig.right.get(), 0);
        assert_eq!(bank.step_index(MotorId::Left), Some(0));
        assert!(!bank.any_busy());
    }

    #[test]
    fn test_register_rejects_mismatched_timer() {
        let rig = Rig::new();
        let other = TimerState::default();
        let mut bank = rig.bank();

        let err = bank
            .register(
                MotorId::Right,
                FakeTimer { id: TimerId(6), state: &other },
                FakeCoils { pattern: &rig.right },
            )
            .unwrap_err();
        assert_eq!(err, MotorError::SharedTimerMismatch);

        // The existing registration is untouched.
        assert!(!bank.is_busy(MotorId::Right));
        bank.move_steps(MotorId::Right, 4, Direction::Forward).unwrap();
        assert!(bank.is_busy(MotorId::Right));
    }

    #[test]
    fn test_move_validation() {
        let rig = Rig::new();
        let mut bank = rig.bank();

        assert_eq!(
            bank.move_steps(MotorId::Left, 0, Direction::Forward),
            Err(MotorError::ZeroSteps)
        );

        let mut empty: StepperBank<FakeCoils<'_>, FakeTimer<'_>> = StepperBank::new();
        assert_eq!(
            empty.move_steps(MotorId::Left, 8, Direction::Forward),
            Err(MotorError::NoTimer)
        );
    }

    #[test]
    fn test_move_starts_timer() {
        let rig = Rig::new();
        let mut bank = rig.bank();

        assert!(!rig.timer.running.get());
        bank.move_steps(MotorId::Left, 8, Direction::Forward).unwrap();
        assert!(rig.timer.running.get());
        assert!(bank.is_busy(MotorId::Left));
        assert!(!bank.is_busy(MotorId::Right));
    }

    #[test]
    fn test_exhaustion_after_exact_step_count() {
        let rig = Rig::new();
        let mut bank = rig.bank();

        bank.move_steps(MotorId::Left, 3, Direction::Forward).unwrap();
        bank.move_steps(MotorId::Right, 5, Direction::Forward).unwrap();

        for _ in 0..3 {
            bank.on_timer_tick(TimerId(5));
        }
        // Left is exhausted but stays energized while the right still runs.
        assert!(!bank.is_busy(MotorId::Left));
        assert_eq!(rig.left.get(), HALF_STEP_SEQUENCE[3]);
        assert!(rig.timer.running.get());

        for _ in 0..2 {
            bank.on_timer_tick(TimerId(5));
        }
        // All motors exhausted on the fifth tick: timer stopped, coils off.
        assert!(!bank.is_busy(MotorId::Right));
        assert!(!rig.timer.running.get());
        assert_eq!(rig.left.get(), 0);
        assert_eq!(rig.right.get(), 0);
    }

    #[test]
    fn test_full_revolution_returns_to_sequence_start() {
        let rig = Rig::new();
        let mut bank = rig.bank();

        bank.move_steps(MotorId::Left, STEPS_PER_REV, Direction::Forward)
            .unwrap();
        for _ in 0..STEPS_PER_REV {
            bank.on_timer_tick(TimerId(5));
        }

        // One output-shaft revolution is a whole number of sequence
        // cycles, so the motor lands back on index 0.
        assert_eq!(STEPS_PER_REV % HALF_STEP_SEQUENCE.len() as u16, 0);
        assert_eq!(bank.step_index(MotorId::Left), Some(0));
        assert!(!bank.is_busy(MotorId::Left));
    }

    #[test]
    fn test_tick_ignores_other_timer_instances() {
        let rig = Rig::new();
        let mut bank = rig.bank();

        bank.move_steps(MotorId::Left, 2, Direction::Forward).unwrap();
        bank.on_timer_tick(TimerId(9));
        assert_eq!(bank.step_index(MotorId::Left), Some(0));
        assert!(bank.is_busy(MotorId::Left));
    }

    #[test]
    fn test_stop_keeps_timer_while_other_motor_busy() {
        let rig = Rig::new();
        let mut bank = rig.bank();

        bank.move_steps(MotorId::Left, 10, Direction::Forward).unwrap();
        bank.move_steps(MotorId::Right, 10, Direction::Forward).unwrap();
        bank.on_timer_tick(TimerId(5));

        bank.stop(MotorId::Left).unwrap();
        assert_eq!(rig.left.get(), 0);
        assert!(!bank.is_busy(MotorId::Left));
        assert!(rig.timer.running.get());

        bank.stop(MotorId::Right).unwrap();
        assert!(!rig.timer.running.get());
    }

    #[test]
    fn test_speed_preset_rejected_while_busy() {
        let rig = Rig::new();
        let mut bank = rig.bank();

        bank.move_steps(MotorId::Left, 4, Direction::Forward).unwrap();
        assert_eq!(
            bank.set_speed_preset(SpeedPreset::High),
            Err(MotorError::Busy)
        );

        for _ in 0..4 {
            bank.on_timer_tick(TimerId(5));
        }
        bank.set_speed_preset(SpeedPreset::High).unwrap();
        assert_eq!(rig.timer.base.get(), Some((4_199, 9)));
    }

    #[test]
    fn test_preset_bases() {
        assert_eq!(SpeedPreset::Low.timer_base(), (16_799, 9));
        assert_eq!(SpeedPreset::Medium.timer_base(), (8_399, 9));
        assert_eq!(SpeedPreset::High.timer_base(), (4_199, 9));
    }

    proptest! {
        #[test]
        fn step_index_wraps_in_both_directions(start in 0u16..8, reverse in proptest::bool::ANY) {
            let rig = Rig::new();
            let mut bank = rig.bank();

            // Walk forward to the starting index, then step once in the
            // direction under test.
            if start > 0 {
                bank.move_steps(MotorId::Left, start, Direction::Forward).unwrap();
                for _ in 0..start {
                    bank.on_timer_tick(TimerId(5));
                }
            }
            prop_assert_eq!(bank.step_index(MotorId::Left), Some(start as u8));

            let direction = if reverse { Direction::Reverse } else { Direction::Forward };
            bank.move_steps(MotorId::Left, 1, direction).unwrap();
            bank.on_timer_tick(TimerId(5));

            let expected = (start as i8 + direction.offset()).rem_euclid(8) as u8;
            let index = bank.step_index(MotorId::Left).unwrap();
            prop_assert_eq!(index, expected);
            prop_assert!(index < 8);
        }
    }
}
