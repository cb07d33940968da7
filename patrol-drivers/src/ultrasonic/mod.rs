//! HC-SR04 ultrasonic rangefinder bank
//!
//! Each sensor is measured by timing its echo pulse with an input-capture
//! channel: a trigger pulse goes out, the capture channel latches the
//! counter on the echo's rising edge, is re-armed for the falling edge,
//! and latches again. The elapsed ticks between the two edges encode the
//! round-trip time of flight.
//!
//! The capture timer must be configured so that one counter tick equals
//! one microsecond; the distance conversion assumes that resolution.

use heapless::Vec;
use patrol_core::traits::{
    CaptureChannel, Channel, EdgePolarity, RangeSensors, SensorError, SensorId, TimerId,
    TriggerPulse,
};

/// Half the speed of sound, in centimeters per microsecond-tick.
pub const SPEED_OF_SOUND_CM_PER_US: f32 = 0.0343;

/// Capacity of the sensor registry.
pub const MAX_SENSORS: usize = 4;

/// Where the echo edge-timing cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EchoState {
    /// Idle or triggered; the capture channel is armed for a rising edge.
    WaitingForRising,
    /// Echo in flight; the capture channel is armed for the falling edge.
    WaitingForFalling,
}

/// One HC-SR04 rangefinder.
#[derive(Debug)]
pub struct HcSr04<C, P> {
    capture: C,
    trigger: P,
    state: EchoState,
    ready: bool,
    t_rise: u16,
    t_fall: u16,
}

impl<C, P> HcSr04<C, P>
where
    C: CaptureChannel,
    P: TriggerPulse,
{
    fn new(capture: C, trigger: P) -> Self {
        Self {
            capture,
            trigger,
            state: EchoState::WaitingForRising,
            ready: false,
            t_rise: 0,
            t_fall: 0,
        }
    }

    /// Start a new echo cycle by emitting a trigger pulse.
    ///
    /// Refused while a cycle is in flight or an unconsumed reading is
    /// pending, so a reading can never be torn by a new measurement.
    pub fn trigger(&mut self) -> Result<(), SensorError> {
        if self.ready || self.state == EchoState::WaitingForFalling {
            return Err(SensorError::Busy);
        }

        self.ready = false;
        self.t_rise = 0;
        self.t_fall = 0;
        self.trigger.fire();
        Ok(())
    }

    /// True when a complete, unconsumed reading is available.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Consume the pending reading in centimeters.
    ///
    /// Single-consumer: the reading is cleared on return, and the next
    /// call yields `None` until a new echo cycle completes. Valid only
    /// when the capture timer ticks at 1 µs.
    pub fn take_distance_cm(&mut self) -> Option<f32> {
        if !self.ready {
            return None;
        }

        // Unsigned wraparound subtraction over the capture counter width.
        let elapsed = self.t_fall.wrapping_sub(self.t_rise);
        self.ready = false;
        Some((elapsed as f32 / 2.0) * SPEED_OF_SOUND_CM_PER_US)
    }

    /// Whether a capture interrupt on `timer`/`channel` belongs to this
    /// sensor's echo channel.
    pub fn matches(&self, timer: TimerId, channel: Channel) -> bool {
        self.capture.timer_id() == timer && self.capture.channel() == channel
    }

    /// Handle one capture event on this sensor's echo channel.
    ///
    /// Rising edge: latch `t_rise` and re-arm for the falling edge.
    /// Falling edge: latch `t_fall`, mark the reading ready and re-arm
    /// for the next cycle's rising edge. Re-arming reconfigures the edge
    /// polarity before re-enabling the interrupt.
    pub fn on_edge(&mut self) {
        match self.state {
            EchoState::WaitingForRising => {
                self.t_rise = self.capture.captured();
                self.capture.arm(EdgePolarity::Falling);
                self.state = EchoState::WaitingForFalling;
            }
            EchoState::WaitingForFalling => {
                self.t_fall = self.capture.captured();
                self.capture.arm(EdgePolarity::Rising);
                self.ready = true;
                self.state = EchoState::WaitingForRising;
            }
        }
    }
}

/// Bounded registry of rangefinders sharing the capture dispatch.
///
/// Two sensors may share one physical capture timer as long as they use
/// distinct channels; dispatch matches on both.
#[derive(Debug, Default)]
pub struct SensorBank<C, P> {
    sensors: Vec<HcSr04<C, P>, MAX_SENSORS>,
}

impl<C, P> SensorBank<C, P>
where
    C: CaptureChannel,
    P: TriggerPulse,
{
    /// Create an empty bank.
    pub fn new() -> Self {
        Self { sensors: Vec::new() }
    }

    /// Register a sensor and arm its echo channel for the first rising
    /// edge. Fails with [`SensorError::RegistryFull`] at capacity,
    /// leaving existing registrations untouched.
    pub fn register(&mut self, capture: C, trigger: P) -> Result<SensorId, SensorError> {
        if self.sensors.is_full() {
            return Err(SensorError::RegistryFull);
        }

        let mut sensor = HcSr04::new(capture, trigger);
        sensor.capture.arm(EdgePolarity::Rising);

        let id = SensorId(self.sensors.len() as u8);
        // Cannot fail: capacity was checked above.
        let _ = self.sensors.push(sensor);
        Ok(id)
    }

    /// Number of registered sensors.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// True when no sensors are registered.
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    fn get(&self, sensor: SensorId) -> Option<&HcSr04<C, P>> {
        self.sensors.get(sensor.0 as usize)
    }

    fn get_mut(&mut self, sensor: SensorId) -> Option<&mut HcSr04<C, P>> {
        self.sensors.get_mut(sensor.0 as usize)
    }
}

impl<C, P> RangeSensors for SensorBank<C, P>
where
    C: CaptureChannel,
    P: TriggerPulse,
{
    fn trigger(&mut self, sensor: SensorId) -> Result<(), SensorError> {
        self.get_mut(sensor).ok_or(SensorError::Unknown)?.trigger()
    }

    fn is_ready(&self, sensor: SensorId) -> bool {
        self.get(sensor).is_some_and(HcSr04::is_ready)
    }

    fn take_distance_cm(&mut self, sensor: SensorId) -> Option<f32> {
        self.get_mut(sensor)?.take_distance_cm()
    }

    fn contains(&self, sensor: SensorId) -> bool {
        (sensor.0 as usize) < self.sensors.len()
    }

    fn on_capture(&mut self, timer: TimerId, channel: Channel) {
        for sensor in self
            .sensors
            .iter_mut()
            .filter(|s| s.matches(timer, channel))
        {
            sensor.on_edge();
        }
    }
}
