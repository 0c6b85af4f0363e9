//! Hardware abstraction traits for the relay, inputs, and time sources.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`RelayOutput`] | Pump relay coil drive |
//! | [`EmergencyInput`] | Active-low emergency stop switch |
//! | [`InputSource`] | Rotary encoder position and button gestures |
//! | [`TimeSource`] | Wall-clock time of day (RTC) |
//! | [`SensorSource`] | Supply current and voltage readings |
//! | [`Clock`] | Monotonic millisecond counter |
//!
//! # Example
//!
//! ```rust
//! use rs_pumptimer::traits::{RelayOutput, TimeSource, ClockReading};
//! use rs_pumptimer::hal::{MockRelay, MockRtc};
//!
//! let mut relay = MockRelay::new();
//! relay.set_relay(true).unwrap();
//! assert!(relay.energized);
//!
//! let mut rtc = MockRtc::at(8, 0, 0);
//! assert_eq!(rtc.now().unwrap(), ClockReading::new(8, 0, 0));
//! ```

/// Time of day as read from the real-time clock.
///
/// Fields are always in range: `hour` 0-23, `minute` 0-59, `second` 0-59.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockReading {
    /// Hour of day (0-23).
    pub hour: u8,
    /// Minute of hour (0-59).
    pub minute: u8,
    /// Second of minute (0-59).
    pub second: u8,
}

impl ClockReading {
    /// Creates a reading, wrapping each field into its valid range.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_pumptimer::ClockReading;
    ///
    /// let t = ClockReading::new(25, 61, 5);
    /// assert_eq!((t.hour, t.minute, t.second), (1, 1, 5));
    /// ```
    pub const fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour: hour % 24,
            minute: minute % 60,
            second: second % 60,
        }
    }

    /// Builds a reading from seconds since midnight (wrapping at 24h).
    pub const fn from_seconds_of_day(secs: u32) -> Self {
        let secs = secs % 86_400;
        Self {
            hour: (secs / 3600) as u8,
            minute: ((secs / 60) % 60) as u8,
            second: (secs % 60) as u8,
        }
    }

    /// Seconds elapsed since midnight.
    pub const fn seconds_of_day(&self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }

    /// Returns true at the first second of the given hour and minute.
    #[inline]
    pub const fn is_start_of(&self, hour: u8, minute: u8) -> bool {
        self.hour == hour && self.minute == minute && self.second == 0
    }
}

/// Latest supply measurements used by the safety interlocks.
///
/// Units are whole amps and whole volts, the same resolution the settings
/// record persists them at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReadings {
    /// Pump supply current in amps.
    pub current_amps: i16,
    /// Supply voltage in volts.
    pub voltage_volts: i16,
}

impl SensorReadings {
    /// Creates a sensor snapshot.
    pub const fn new(current_amps: i16, voltage_volts: i16) -> Self {
        Self {
            current_amps,
            voltage_volts,
        }
    }
}

/// Discrete gesture reported by the encoder push button.
///
/// # Default
///
/// Defaults to [`None`](Self::None).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ButtonEvent {
    /// No gesture since the last poll.
    #[default]
    None,
    /// Single short press.
    Clicked,
    /// Two short presses within the double-click window.
    DoubleClicked,
    /// Button held past the hold threshold.
    Held,
}

impl ButtonEvent {
    /// Encodes the event for a one-byte atomic mailbox.
    #[inline]
    pub const fn to_u8(self) -> u8 {
        match self {
            ButtonEvent::None => 0,
            ButtonEvent::Clicked => 1,
            ButtonEvent::DoubleClicked => 2,
            ButtonEvent::Held => 3,
        }
    }

    /// Decodes a mailbox byte. Unknown values decode as [`ButtonEvent::None`].
    #[inline]
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => ButtonEvent::Clicked,
            2 => ButtonEvent::DoubleClicked,
            3 => ButtonEvent::Held,
            _ => ButtonEvent::None,
        }
    }

    /// Returns true for anything other than [`ButtonEvent::None`].
    #[inline]
    pub const fn is_some(self) -> bool {
        !matches!(self, ButtonEvent::None)
    }
}

/// Pump relay output.
///
/// Implementations drive the relay coil (directly or through a transistor
/// stage). `set_relay(true)` energizes the pump.
pub trait RelayOutput {
    /// Error type for pin operations.
    type Error;

    /// Energize (`true`) or release (`false`) the relay.
    fn set_relay(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Convenience method to release the relay.
    fn release(&mut self) -> Result<(), Self::Error> {
        self.set_relay(false)
    }
}

/// Emergency stop input.
///
/// The physical switch is active-low; implementations hide the polarity and
/// report `true` while the stop is asserted.
pub trait EmergencyInput {
    /// Returns true while the emergency stop is asserted.
    fn is_asserted(&mut self) -> bool;
}

/// Rotary encoder with push button, serviced outside the main loop.
///
/// # Implementation Notes
///
/// - `position()` returns a monotonic accumulator; callers diff it against
///   the last value they saw instead of having the source reset it
/// - `poll_button()` consumes the pending gesture, so a second call returns
///   [`ButtonEvent::None`] until a new gesture is decoded
pub trait InputSource {
    /// Takes the pending button gesture, if any.
    fn poll_button(&mut self) -> ButtonEvent;

    /// Current accumulated detent count (positive = clockwise).
    fn position(&mut self) -> i32;
}

/// Wall-clock time source (battery-backed RTC or equivalent).
pub trait TimeSource {
    /// Error type for clock reads.
    type Error;

    /// Reads the current time of day.
    fn now(&mut self) -> Result<ClockReading, Self::Error>;
}

/// Current and voltage sensing for the safety interlocks.
pub trait SensorSource {
    /// Error type for sensor reads.
    type Error;

    /// Samples current and voltage.
    fn read_sensors(&mut self) -> Result<SensorReadings, Self::Error>;
}

/// Monotonic millisecond time source.
///
/// Drives the relay countdown. On the board this wraps the ESP-IDF high
/// resolution timer; in tests it is [`MockClock`](crate::hal::MockClock).
///
/// # Example
///
/// ```rust
/// use rs_pumptimer::traits::Clock;
/// use rs_pumptimer::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// clock.advance(60_000);
/// assert_eq!(clock.now_ms(), 60_000);
/// ```
pub trait Clock {
    /// Returns milliseconds since an arbitrary epoch. Never decreases.
    fn now_ms(&self) -> u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_reading_wraps_fields() {
        let t = ClockReading::new(24, 60, 60);
        assert_eq!(t, ClockReading::new(0, 0, 0));
    }

    #[test]
    fn clock_reading_seconds_of_day() {
        let t = ClockReading::new(8, 30, 15);
        assert_eq!(t.seconds_of_day(), 8 * 3600 + 30 * 60 + 15);
        assert_eq!(ClockReading::from_seconds_of_day(t.seconds_of_day()), t);
        assert_eq!(
            ClockReading::from_seconds_of_day(86_400 + 61),
            ClockReading::new(0, 1, 1)
        );
    }

    #[test]
    fn start_of_minute_only_at_second_zero() {
        assert!(ClockReading::new(8, 0, 0).is_start_of(8, 0));
        assert!(!ClockReading::new(8, 0, 1).is_start_of(8, 0));
        assert!(!ClockReading::new(8, 1, 0).is_start_of(8, 0));
    }

    #[test]
    fn button_event_mailbox_encoding() {
        for event in [
            ButtonEvent::None,
            ButtonEvent::Clicked,
            ButtonEvent::DoubleClicked,
            ButtonEvent::Held,
        ] {
            assert_eq!(ButtonEvent::from_u8(event.to_u8()), event);
        }
        assert_eq!(ButtonEvent::from_u8(200), ButtonEvent::None);
    }

    #[test]
    fn button_event_default_is_none() {
        assert_eq!(ButtonEvent::default(), ButtonEvent::None);
        assert!(!ButtonEvent::None.is_some());
        assert!(ButtonEvent::Held.is_some());
    }

    struct TestRelay {
        on: bool,
        writes: usize,
    }

    impl RelayOutput for TestRelay {
        type Error = ();

        fn set_relay(&mut self, on: bool) -> Result<(), ()> {
            self.on = on;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn relay_release_default_impl() {
        let mut relay = TestRelay { on: true, writes: 0 };
        relay.release().unwrap();
        assert!(!relay.on);
        assert_eq!(relay.writes, 1);
    }
}
