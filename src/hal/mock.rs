//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for every peripheral trait, so the whole
//! controller can be driven on a desktop.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockRelay`] | [`RelayOutput`] | Records every relay write |
//! | [`MockEncoder`] | [`InputSource`] | Settable position, queued gestures |
//! | [`MockEmergency`] | [`EmergencyInput`] | Settable emergency switch |
//! | [`MockRtc`] | [`TimeSource`] | Settable time of day |
//! | [`MockSensors`] | [`SensorSource`] | Settable current and voltage |
//! | [`MockClock`] | [`Clock`] | Controllable monotonic time |
//! | [`MockDisplay`] | [`CharDisplay`] | Character grid you can read back |
//! | [`MockEeprom`] | [`SettingsStore`] | Byte array with write counting |
//!
//! # Example
//!
//! ```rust
//! use rs_pumptimer::hal::{MockEncoder, MockRtc};
//! use rs_pumptimer::traits::{InputSource, TimeSource};
//! use rs_pumptimer::{ButtonEvent, ClockReading};
//!
//! let mut encoder = MockEncoder::new();
//! encoder.queue_button(ButtonEvent::DoubleClicked);
//! encoder.turn(3);
//!
//! assert_eq!(encoder.position(), 3);
//! assert_eq!(encoder.poll_button(), ButtonEvent::DoubleClicked);
//! assert_eq!(encoder.poll_button(), ButtonEvent::None);
//!
//! let mut rtc = MockRtc::at(7, 59, 59);
//! rtc.advance_seconds(1);
//! assert_eq!(rtc.now().unwrap(), ClockReading::new(8, 0, 0));
//! ```
//!
//! [`RelayOutput`]: crate::traits::RelayOutput
//! [`InputSource`]: crate::traits::InputSource
//! [`EmergencyInput`]: crate::traits::EmergencyInput
//! [`TimeSource`]: crate::traits::TimeSource
//! [`SensorSource`]: crate::traits::SensorSource
//! [`Clock`]: crate::traits::Clock
//! [`CharDisplay`]: crate::traits::CharDisplay
//! [`SettingsStore`]: crate::traits::SettingsStore

extern crate alloc;
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::traits::{
    ButtonEvent, CharDisplay, Clock, ClockReading, EmergencyInput, Field, InputSource,
    RelayOutput, SensorReadings, SensorSource, SettingsStore, TimeSource, FIELD_SIZE,
};

// ============================================================================
// Outputs
// ============================================================================

/// Mock relay output.
///
/// Records every write for verification.
///
/// # Example
///
/// ```rust
/// use rs_pumptimer::hal::MockRelay;
/// use rs_pumptimer::traits::RelayOutput;
///
/// let mut relay = MockRelay::new();
/// relay.set_relay(true).unwrap();
/// relay.set_relay(false).unwrap();
///
/// assert!(!relay.energized);
/// assert_eq!(relay.writes, vec![true, false]);
/// ```
#[derive(Debug, Default)]
pub struct MockRelay {
    /// Current coil state.
    pub energized: bool,
    /// Every value passed to `set_relay`, oldest first.
    pub writes: Vec<bool>,
}

impl MockRelay {
    /// Creates a de-energized relay with no recorded writes.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RelayOutput for MockRelay {
    type Error = ();

    fn set_relay(&mut self, on: bool) -> Result<(), ()> {
        self.energized = on;
        self.writes.push(on);
        Ok(())
    }
}

/// Mock character display.
///
/// Keeps a grid of cells so tests can read back exactly what is on screen.
/// Writes past the last column are dropped, like a real LCD.
#[derive(Debug, Clone)]
pub struct MockDisplay {
    columns: usize,
    cells: Vec<Vec<char>>,
    cursor: (usize, usize),
    /// Number of times `clear` was called.
    pub clear_count: usize,
}

impl MockDisplay {
    /// Creates a blank display of `columns` × `rows`.
    pub fn new(columns: u8, rows: u8) -> Self {
        let columns = usize::from(columns);
        Self {
            columns,
            cells: vec![vec![' '; columns]; usize::from(rows)],
            cursor: (0, 0),
            clear_count: 0,
        }
    }

    /// Returns a row with trailing blanks trimmed.
    pub fn line(&self, row: usize) -> String {
        self.cells
            .get(row)
            .map(|cells| cells.iter().collect::<String>().trim_end().into())
            .unwrap_or_default()
    }
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self::new(16, 2)
    }
}

impl CharDisplay for MockDisplay {
    type Error = ();

    fn clear(&mut self) -> Result<(), ()> {
        for row in &mut self.cells {
            row.fill(' ');
        }
        self.cursor = (0, 0);
        self.clear_count += 1;
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), ()> {
        self.cursor = (usize::from(col), usize::from(row));
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), ()> {
        let (mut col, row) = self.cursor;
        if let Some(cells) = self.cells.get_mut(row) {
            for ch in text.chars() {
                if col >= self.columns {
                    break;
                }
                cells[col] = ch;
                col += 1;
            }
        }
        self.cursor = (col, row);
        Ok(())
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Mock rotary encoder.
///
/// The position is set directly; gestures come out in FIFO order.
#[derive(Debug, Default)]
pub struct MockEncoder {
    /// Absolute position in detents.
    pub position: i32,
    buttons: VecDeque<ButtonEvent>,
}

impl MockEncoder {
    /// Creates an encoder at position 0 with no queued gestures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotates by `detents` (negative for counter-clockwise).
    pub fn turn(&mut self, detents: i32) {
        self.position = self.position.wrapping_add(detents);
    }

    /// Queues a gesture for a later `poll_button`.
    pub fn queue_button(&mut self, event: ButtonEvent) {
        self.buttons.push_back(event);
    }
}

impl InputSource for MockEncoder {
    fn poll_button(&mut self) -> ButtonEvent {
        self.buttons.pop_front().unwrap_or_default()
    }

    fn position(&mut self) -> i32 {
        self.position
    }
}

/// Mock emergency stop switch.
#[derive(Debug, Default)]
pub struct MockEmergency {
    /// Whether the switch is asserted.
    pub asserted: bool,
}

impl MockEmergency {
    /// Creates a released switch.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EmergencyInput for MockEmergency {
    fn is_asserted(&mut self) -> bool {
        self.asserted
    }
}

/// Mock supply sensors.
#[derive(Debug, Default)]
pub struct MockSensors {
    /// Reading returned by `read_sensors`.
    pub readings: SensorReadings,
}

impl MockSensors {
    /// Creates sensors reporting `current_amps` and `voltage_volts`.
    pub fn new(current_amps: i16, voltage_volts: i16) -> Self {
        Self {
            readings: SensorReadings::new(current_amps, voltage_volts),
        }
    }
}

impl SensorSource for MockSensors {
    type Error = ();

    fn read_sensors(&mut self) -> Result<SensorReadings, ()> {
        Ok(self.readings)
    }
}

// ============================================================================
// Time
// ============================================================================

/// Mock real-time clock.
#[derive(Debug, Default)]
pub struct MockRtc {
    /// Seconds since midnight.
    pub seconds_of_day: u32,
}

impl MockRtc {
    /// Creates an RTC showing `hour:minute:second`.
    pub fn at(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            seconds_of_day: ClockReading::new(hour, minute, second).seconds_of_day(),
        }
    }

    /// Moves the time forward, wrapping at midnight.
    pub fn advance_seconds(&mut self, seconds: u32) {
        self.seconds_of_day = (self.seconds_of_day + seconds % 86_400) % 86_400;
    }
}

impl TimeSource for MockRtc {
    type Error = ();

    fn now(&mut self) -> Result<ClockReading, ()> {
        Ok(ClockReading::from_seconds_of_day(self.seconds_of_day))
    }
}

/// Mock clock for testing.
///
/// Provides a controllable time source for testing time-dependent behavior.
///
/// # Example
///
/// ```rust
/// use rs_pumptimer::hal::MockClock;
/// use rs_pumptimer::traits::Clock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.set(1000);
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self { current_ms: 0 }
    }

    /// Sets the current time in milliseconds.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Default size of a [`MockEeprom`], matching a 1 KiB part.
pub const MOCK_EEPROM_SIZE: usize = 1024;

/// Mock EEPROM.
///
/// A plain byte array with little-endian [`Field`] access. Reads and writes
/// outside the array fail with `Err(())`.
///
/// # Example
///
/// ```rust
/// use rs_pumptimer::hal::MockEeprom;
/// use rs_pumptimer::traits::SettingsStore;
///
/// let mut eeprom = MockEeprom::erased(16);
/// assert_eq!(eeprom.read_field(0).unwrap(), -1);
///
/// eeprom.write_field(0, 300).unwrap();
/// assert_eq!(&eeprom.bytes[..2], &[0x2C, 0x01]);
/// assert!(!eeprom.update_field(0, 300).unwrap());
/// assert_eq!(eeprom.field_writes, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockEeprom {
    /// Raw contents.
    pub bytes: Vec<u8>,
    /// Number of `write_field` calls that reached the array.
    pub field_writes: usize,
    /// When set, every write fails and leaves the bytes untouched.
    pub fail_writes: bool,
}

impl MockEeprom {
    /// Creates a zero-filled EEPROM of [`MOCK_EEPROM_SIZE`] bytes.
    pub fn new() -> Self {
        Self {
            bytes: vec![0; MOCK_EEPROM_SIZE],
            field_writes: 0,
            fail_writes: false,
        }
    }

    /// Creates an erased (all `0xFF`) EEPROM of `size` bytes.
    pub fn erased(size: usize) -> Self {
        Self {
            bytes: vec![0xFF; size],
            field_writes: 0,
            fail_writes: false,
        }
    }

    fn span(&self, offset: usize) -> Option<core::ops::Range<usize>> {
        let end = offset.checked_add(FIELD_SIZE)?;
        (end <= self.bytes.len()).then_some(offset..end)
    }
}

impl Default for MockEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for MockEeprom {
    type Error = ();

    fn read_field(&mut self, offset: usize) -> Result<Field, ()> {
        let span = self.span(offset).ok_or(())?;
        let mut raw = [0u8; FIELD_SIZE];
        raw.copy_from_slice(&self.bytes[span]);
        Ok(Field::from_le_bytes(raw))
    }

    fn write_field(&mut self, offset: usize, value: Field) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        let span = self.span(offset).ok_or(())?;
        self.bytes[span].copy_from_slice(&value.to_le_bytes());
        self.field_writes += 1;
        Ok(())
    }
}
