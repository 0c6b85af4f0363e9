//! Operating settings and their fixed-layout persisted record.
//!
//! The record is five [`Field`]s written back to back with no header,
//! version byte or checksum:
//!
//! ```text
//! base + 0  hour
//! base + 2  minute
//! base + 4  duration (minutes)
//! base + 6  last current (A)
//! base + 8  last voltage (V)
//! ```
//!
//! The layout is bit-compatible with boards that already have settings in
//! EEPROM, so it must not change.
//!
//! # Example
//!
//! ```rust
//! use rs_pumptimer::settings::{OperatingSettings, SettingsRepository};
//! use rs_pumptimer::hal::MockEeprom;
//! use rs_pumptimer::SensorReadings;
//!
//! let mut repo = SettingsRepository::new(MockEeprom::new(), 0);
//! let settings = OperatingSettings::new(8, 0, 20);
//! repo.save(&settings, SensorReadings::new(5, 52)).unwrap();
//!
//! let record = repo.load().unwrap();
//! assert_eq!(record.settings(20), settings);
//! ```

use crate::traits::{Field, SensorReadings, SettingsStore, FIELD_SIZE};

/// Number of fields in the persisted record.
pub const RECORD_FIELDS: usize = 5;

/// Size of the persisted record in bytes.
pub const RECORD_SIZE: usize = RECORD_FIELDS * FIELD_SIZE;

/// Longest run the duration field can hold, in minutes.
pub const MAX_DURATION_MINUTES: u8 = 60;

/// Adds `delta` to `value` and wraps the result into `0..modulus`.
///
/// Negative results wrap from the top instead of clamping, so scrolling
/// below zero lands on the largest value.
///
/// # Examples
///
/// ```
/// use rs_pumptimer::settings::wrap_add;
///
/// assert_eq!(wrap_add(60, 1, 61), 0);
/// assert_eq!(wrap_add(0, -1, 61), 60);
/// assert_eq!(wrap_add(23, 25, 24), 0);
/// ```
pub fn wrap_add(value: u8, delta: i32, modulus: u8) -> u8 {
    (i64::from(value) + i64::from(delta)).rem_euclid(i64::from(modulus)) as u8
}

/// Schedule and run length configured through the settings editor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperatingSettings {
    /// Hour of the daily auto-start (0-23).
    pub scheduled_hour: u8,
    /// Minute of the daily auto-start (0-59).
    pub scheduled_minute: u8,
    /// Run length in minutes (0-60).
    pub duration_minutes: u8,
}

impl OperatingSettings {
    /// Creates settings, wrapping each field into its valid range.
    pub const fn new(hour: u8, minute: u8, duration_minutes: u8) -> Self {
        Self {
            scheduled_hour: hour % 24,
            scheduled_minute: minute % 60,
            duration_minutes: duration_minutes % (MAX_DURATION_MINUTES + 1),
        }
    }

    /// All-zero settings, as left behind by delete-all.
    pub const fn zeroed() -> Self {
        Self::new(0, 0, 0)
    }

    /// Countdown length of one run, in seconds.
    #[inline]
    pub const fn countdown_seconds(&self) -> i32 {
        self.duration_minutes as i32 * 60
    }

    /// Scrolls the schedule time.
    ///
    /// Hour and minute move together by the same `delta`, each wrapping in its
    /// own range.
    pub fn scroll_time(&mut self, delta: i32) {
        self.scheduled_hour = wrap_add(self.scheduled_hour, delta, 24);
        self.scheduled_minute = wrap_add(self.scheduled_minute, delta, 60);
    }

    /// Scrolls the run length, wrapping 60 -> 0 and 0 -> 60.
    pub fn scroll_duration(&mut self, delta: i32) {
        self.duration_minutes = wrap_add(self.duration_minutes, delta, MAX_DURATION_MINUTES + 1);
    }
}

/// One field of the persisted record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordField {
    /// Scheduled hour.
    Hour = 0,
    /// Scheduled minute.
    Minute = 1,
    /// Run length in minutes.
    Duration = 2,
    /// Last-known current.
    Current = 3,
    /// Last-known voltage.
    Voltage = 4,
}

impl RecordField {
    /// Fields in storage order.
    pub const ALL: [RecordField; RECORD_FIELDS] = [
        RecordField::Hour,
        RecordField::Minute,
        RecordField::Duration,
        RecordField::Current,
        RecordField::Voltage,
    ];

    /// Byte offset of this field for a record starting at `base`.
    #[inline]
    pub const fn offset(self, base: usize) -> usize {
        base + self as usize * FIELD_SIZE
    }
}

/// The raw persisted record, exactly as stored.
///
/// Values are not range-checked here; [`settings`](Self::settings) sanitizes
/// them when turning the record into [`OperatingSettings`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersistedRecord {
    /// Scheduled hour.
    pub hour: Field,
    /// Scheduled minute.
    pub minute: Field,
    /// Run length in minutes.
    pub duration: Field,
    /// Last-known current (A).
    pub current: Field,
    /// Last-known voltage (V).
    pub voltage: Field,
}

impl PersistedRecord {
    /// The record delete-all writes.
    pub const ZEROED: Self = Self {
        hour: 0,
        minute: 0,
        duration: 0,
        current: 0,
        voltage: 0,
    };

    /// Builds the record a save writes.
    pub fn from_parts(settings: &OperatingSettings, sensors: SensorReadings) -> Self {
        Self {
            hour: Field::from(settings.scheduled_hour),
            minute: Field::from(settings.scheduled_minute),
            duration: Field::from(settings.duration_minutes),
            current: sensors.current_amps,
            voltage: sensors.voltage_volts,
        }
    }

    /// Returns the value of one field.
    pub const fn get(&self, field: RecordField) -> Field {
        match field {
            RecordField::Hour => self.hour,
            RecordField::Minute => self.minute,
            RecordField::Duration => self.duration,
            RecordField::Current => self.current,
            RecordField::Voltage => self.voltage,
        }
    }

    /// Sets the value of one field.
    pub fn set(&mut self, field: RecordField, value: Field) {
        match field {
            RecordField::Hour => self.hour = value,
            RecordField::Minute => self.minute = value,
            RecordField::Duration => self.duration = value,
            RecordField::Current => self.current = value,
            RecordField::Voltage => self.voltage = value,
        }
    }

    /// Reads the record starting at `base`.
    pub fn read_from<S: SettingsStore>(store: &mut S, base: usize) -> Result<Self, S::Error> {
        let mut record = Self::ZEROED;
        for field in RecordField::ALL {
            record.set(field, store.read_field(field.offset(base))?);
        }
        Ok(record)
    }

    /// Writes the record starting at `base`, skipping fields whose stored value
    /// already matches.
    ///
    /// Returns the number of fields actually written.
    pub fn write_to<S: SettingsStore>(&self, store: &mut S, base: usize) -> Result<usize, S::Error> {
        let mut written = 0;
        for field in RecordField::ALL {
            if store.update_field(field.offset(base), self.get(field))? {
                written += 1;
            }
        }
        Ok(written)
    }

    /// Converts to operating settings.
    ///
    /// Out-of-range hour or minute (erased or corrupted storage) read as zero;
    /// an out-of-range duration reads as `default_duration`.
    pub fn settings(&self, default_duration: u8) -> OperatingSettings {
        let hour = in_range(self.hour, 23).unwrap_or(0);
        let minute = in_range(self.minute, 59).unwrap_or(0);
        let duration = in_range(self.duration, MAX_DURATION_MINUTES).unwrap_or(default_duration);
        OperatingSettings::new(hour, minute, duration)
    }

    /// Last-known sensor values, with erased fields (`-1`) read as zero.
    pub fn sensors(&self) -> SensorReadings {
        SensorReadings::new(self.current.max(0), self.voltage.max(0))
    }

    /// Run length to resume after a power cut.
    ///
    /// Any valid nonzero stored duration is taken as evidence of an
    /// interrupted run.
    pub fn interrupted_run_minutes(&self) -> Option<u8> {
        in_range(self.duration, MAX_DURATION_MINUTES).filter(|&minutes| minutes > 0)
    }
}

fn in_range(value: Field, max: u8) -> Option<u8> {
    u8::try_from(value).ok().filter(|&v| v <= max)
}

/// Persisted-settings access at a fixed base address.
///
/// Wraps a [`SettingsStore`] and is the only writer of the record. Writes
/// happen on explicit save and delete-all only.
#[derive(Debug)]
pub struct SettingsRepository<S: SettingsStore> {
    store: S,
    base: usize,
}

impl<S: SettingsStore> SettingsRepository<S> {
    /// Creates a repository for the record at `base`.
    pub fn new(store: S, base: usize) -> Self {
        Self { store, base }
    }

    /// Reads the persisted record.
    pub fn load(&mut self) -> Result<PersistedRecord, S::Error> {
        PersistedRecord::read_from(&mut self.store, self.base)
    }

    /// Persists the schedule, run length, and the given sensor snapshot.
    pub fn save(
        &mut self,
        settings: &OperatingSettings,
        sensors: SensorReadings,
    ) -> Result<(), S::Error> {
        let written = PersistedRecord::from_parts(settings, sensors).write_to(&mut self.store, self.base)?;
        log::info!(
            "settings saved: {:02}:{:02} for {} min ({} fields written)",
            settings.scheduled_hour,
            settings.scheduled_minute,
            settings.duration_minutes,
            written
        );
        Ok(())
    }

    /// Resets every persisted field to zero.
    pub fn delete_all(&mut self) -> Result<(), S::Error> {
        let written = PersistedRecord::ZEROED.write_to(&mut self.store, self.base)?;
        log::info!("settings deleted ({} fields written)", written);
        Ok(())
    }

    /// Base address of the record.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a mutable reference to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the repository, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }
}
