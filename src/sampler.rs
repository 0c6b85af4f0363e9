//! Per-tick sampling of the peripherals the controller reads.
//!
//! [`TickSampler`] owns the input side of the board: RTC, encoder, emergency
//! stop, supply sensors and the monotonic clock. Each loop iteration hands it
//! to [`PumpController::poll`](crate::PumpController::poll), which samples
//! everything into a [`TickInput`] and runs one tick.
//!
//! # Example
//!
//! ```rust
//! use rs_pumptimer::hal::{
//!     MockClock, MockDisplay, MockEeprom, MockEmergency, MockEncoder, MockRelay, MockRtc,
//!     MockSensors,
//! };
//! use rs_pumptimer::{ButtonEvent, Config, OperatingSettings, PumpController, TickSampler};
//!
//! let mut pump = PumpController::boot(
//!     MockRelay::new(),
//!     MockEeprom::new(),
//!     MockDisplay::new(16, 2),
//!     Config::default(),
//! )
//! .unwrap();
//! pump.set_settings(OperatingSettings::new(8, 0, 20));
//!
//! let mut inputs = TickSampler::new(
//!     MockRtc::at(12, 0, 0),
//!     MockEncoder::new(),
//!     MockEmergency::new(),
//!     MockSensors::new(5, 52),
//!     MockClock::new(),
//! );
//! inputs.encoder.queue_button(ButtonEvent::Clicked);
//!
//! pump.poll(&mut inputs).unwrap();
//! assert!(pump.relay().is_on());
//! ```

use core::fmt;

use log::{error, warn};

use crate::controller::TickInput;
use crate::traits::{
    Clock, ClockReading, EmergencyInput, InputSource, SensorReadings, SensorSource, TimeSource,
};

/// The input peripherals, sampled once per tick.
///
/// Fields are public so the firmware and tests can reach the drivers
/// (seeding the RTC, turning a mock encoder).
pub struct TickSampler<T, I, E, N, C> {
    /// Time-of-day source.
    pub rtc: T,
    /// Encoder position and button gestures.
    pub encoder: I,
    /// Emergency stop switch.
    pub emergency: E,
    /// Current and voltage sensing.
    pub sensors: N,
    /// Monotonic milliseconds.
    pub clock: C,
}

impl<T, I, E, N, C> TickSampler<T, I, E, N, C>
where
    T: TimeSource,
    T::Error: fmt::Debug,
    I: InputSource,
    E: EmergencyInput,
    N: SensorSource,
    N::Error: fmt::Debug,
    C: Clock,
{
    /// Groups the input peripherals.
    pub fn new(rtc: T, encoder: I, emergency: E, sensors: N, clock: C) -> Self {
        Self {
            rtc,
            encoder,
            emergency,
            sensors,
            clock,
        }
    }

    /// Reads every source once: time, input, emergency stop, sensors.
    ///
    /// A failed clock read repeats `last_clock`. A failed sensor read yields
    /// zero readings, which hold the start lockout and never trip a run.
    pub fn sample(&mut self, last_clock: ClockReading) -> TickInput {
        let now_ms = self.clock.now_ms();

        let clock = self.rtc.now().unwrap_or_else(|e| {
            warn!("clock read failed: {:?}", e);
            last_clock
        });

        let button = self.encoder.poll_button();
        let encoder_position = self.encoder.position();
        let emergency = self.emergency.is_asserted();

        let sensors = self.sensors.read_sensors().unwrap_or_else(|e| {
            error!("sensor read failed: {:?}", e);
            SensorReadings::default()
        });

        TickInput {
            clock,
            now_ms,
            button,
            encoder_position,
            emergency,
            sensors,
        }
    }
}
