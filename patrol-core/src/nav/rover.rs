//! Navigation controller
//!
//! A polled finite state machine that alternately measures the right and
//! left rangefinders, evaluates the obstacle-avoidance rule, and keeps the
//! differential drive moving.

use crate::config::NavConfig;
use crate::nav::decision::{decide, RouteCommand};
use crate::traits::{Channel, Clock, Direction, DriveMotors, MotorId, RangeSensors, SensorId, TimerId};

/// Navigation FSM state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteState {
    /// Triggering / awaiting the right sensor.
    MeasureRight,
    /// Triggering / awaiting the left sensor.
    MeasureLeft,
    /// Both distances fresh; evaluate the decision rule.
    Evaluate,
}

/// Errors from navigation controller setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NavError {
    /// A sensor id does not name a registered sensor.
    UnknownSensor,
    /// The right and left sensor ids are the same sensor.
    SensorClash,
    /// The left and right motor ids are the same motor.
    MotorClash,
}

/// The obstacle-avoidance navigation controller.
///
/// Owns the motor bank, the sensor bank and the clock, and is the single
/// entry point for both the polled main loop ([`Rover::process`]) and the
/// interrupt vectors ([`Rover::on_timer_tick`], [`Rover::on_capture`]).
/// The enclosing firmware must serialize all four entry points behind its
/// platform's critical-section primitive; with one owner and serialized
/// entry, the multi-field driver state is never observed mid-update.
///
/// `process` never blocks: a measurement in flight simply leaves the FSM
/// in its current state until the sensor reports ready.
#[derive(Debug)]
pub struct Rover<M, R, C> {
    motors: M,
    sensors: R,
    clock: C,

    right_sensor: SensorId,
    left_sensor: SensorId,
    left_motor: MotorId,
    right_motor: MotorId,
    config: NavConfig,

    state: RouteState,
    desired_command: RouteCommand,
    announced_command: RouteCommand,
    distance_right_cm: f32,
    distance_left_cm: f32,
    last_trigger_ms: u32,
    last_announce_ms: u32,
}

impl<M, R, C> Rover<M, R, C>
where
    M: DriveMotors,
    R: RangeSensors,
    C: Clock,
{
    /// Bind the banks and identities, start in [`RouteState::MeasureRight`]
    /// and immediately issue the initial straight-ahead command.
    ///
    /// Motor and sensor registration must already have happened on the
    /// banks that are handed over here.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        motors: M,
        sensors: R,
        clock: C,
        right_sensor: SensorId,
        left_sensor: SensorId,
        left_motor: MotorId,
        right_motor: MotorId,
        config: NavConfig,
    ) -> Result<Self, NavError> {
        if !sensors.contains(right_sensor) || !sensors.contains(left_sensor) {
            return Err(NavError::UnknownSensor);
        }
        if right_sensor == left_sensor {
            return Err(NavError::SensorClash);
        }
        if left_motor == right_motor {
            return Err(NavError::MotorClash);
        }

        let now = clock.now_ms();
        let mut rover = Self {
            motors,
            sensors,
            clock,
            right_sensor,
            left_sensor,
            left_motor,
            right_motor,
            config: config.sanitized(),
            state: RouteState::MeasureRight,
            desired_command: RouteCommand::Straight,
            announced_command: RouteCommand::Straight,
            distance_right_cm: 0.0,
            distance_left_cm: 0.0,
            last_trigger_ms: now,
            last_announce_ms: now,
        };

        rover.issue_motion(RouteCommand::Straight);
        rover.announce(RouteCommand::Straight, now);
        Ok(rover)
    }

    /// One non-blocking FSM pass.
    ///
    /// Invoked once per scheduling tick by the enclosing control loop.
    /// After the pass, if both motors report idle, the current desired
    /// command is re-issued as a fresh motion plan.
    pub fn process(&mut self) {
        match self.state {
            RouteState::MeasureRight => {
                if let Some(d) = self.poll_sensor(self.right_sensor) {
                    self.distance_right_cm = d;
                    self.state = RouteState::MeasureLeft;
                }
            }
            RouteState::MeasureLeft => {
                if let Some(d) = self.poll_sensor(self.left_sensor) {
                    self.distance_left_cm = d;
                    self.state = RouteState::Evaluate;
                }
            }
            RouteState::Evaluate => self.evaluate(),
        }

        if !self.motors.is_busy(self.left_motor) && !self.motors.is_busy(self.right_motor) {
            self.issue_motion(self.desired_command);
        }
    }

    /// Periodic-timer interrupt entry point; fans out to the motor bank.
    pub fn on_timer_tick(&mut self, timer: TimerId) {
        self.motors.on_timer_tick(timer);
    }

    /// Input-capture interrupt entry point; fans out to the sensor bank.
    pub fn on_capture(&mut self, timer: TimerId, channel: Channel) {
        self.sensors.on_capture(timer, channel);
    }

    /// Current FSM state.
    pub fn state(&self) -> RouteState {
        self.state
    }

    /// Command the decision rule currently wants driven.
    pub fn desired_command(&self) -> RouteCommand {
        self.desired_command
    }

    /// Most recently announced command.
    pub fn announced_command(&self) -> RouteCommand {
        self.announced_command
    }

    /// Last measured right-hand distance in centimeters.
    pub fn distance_right_cm(&self) -> f32 {
        self.distance_right_cm
    }

    /// Last measured left-hand distance in centimeters.
    pub fn distance_left_cm(&self) -> f32 {
        self.distance_left_cm
    }

    /// The owned motor bank.
    pub fn motors(&self) -> &M {
        &self.motors
    }

    /// Mutable access to the owned motor bank, e.g. for speed presets.
    pub fn motors_mut(&mut self) -> &mut M {
        &mut self.motors
    }

    /// The owned sensor bank.
    pub fn sensors(&self) -> &R {
        &self.sensors
    }

    /// Mutable access to the owned sensor bank.
    pub fn sensors_mut(&mut self) -> &mut R {
        &mut self.sensors
    }

    /// Trigger the sensor if the spacing interval allows it, then consume
    /// a reading if one is ready.
    fn poll_sensor(&mut self, sensor: SensorId) -> Option<f32> {
        let now = self.clock.now_ms();
        if now.wrapping_sub(self.last_trigger_ms) >= self.config.trigger_interval_ms
            && self.sensors.trigger(sensor).is_ok()
        {
            self.last_trigger_ms = now;
        }

        if self.sensors.is_ready(sensor) {
            self.sensors.take_distance_cm(sensor)
        } else {
            None
        }
    }

    /// Evaluate the decision rule over the fresh distance pair.
    fn evaluate(&mut self) {
        let command = decide(
            self.distance_right_cm,
            self.distance_left_cm,
            self.config.threshold_cm,
        );
        self.desired_command = command;

        let now = self.clock.now_ms();
        if command != self.announced_command
            || now.wrapping_sub(self.last_announce_ms) >= self.config.announce_interval_ms
        {
            self.announce(command, now);
        }

        self.state = RouteState::MeasureRight;
    }

    fn announce(&mut self, command: RouteCommand, now: u32) {
        #[cfg(feature = "defmt")]
        defmt::info!("{=str}", command.label());
        self.announced_command = command;
        self.last_announce_ms = now;
    }

    /// Issue the differential motion plan for `command` to both motors.
    ///
    /// The first successful move starts the shared stepping timer, so a
    /// busy rejection on the other motor is tolerated: that motor picks up
    /// its share on the next issuance once its own move lands.
    fn issue_motion(&mut self, command: RouteCommand) {
        let (left_steps, right_steps) = command.wheel_steps();

        if let Err(_err) = self
            .motors
            .move_steps(self.left_motor, left_steps, Direction::Forward)
        {
            #[cfg(feature = "defmt")]
            defmt::debug!("left motor rejected move: {}", _err);
        }
        if let Err(_err) = self
            .motors
            .move_steps(self.right_motor, right_steps, Direction::Forward)
        {
            #[cfg(feature = "defmt")]
            defmt::debug!("right motor rejected move: {}", _err);
        }
    }
}
