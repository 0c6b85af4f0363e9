//! Controller configuration shared by the desktop tests and the ESP32 build.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use rs_pumptimer::config::{Config, SafetyConfig, ScheduleConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.safety.max_current_amps, 15);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_safety(SafetyConfig::default().with_max_current_amps(12))
//!     .with_schedule(ScheduleConfig::default().with_default_duration_minutes(0));
//! ```

use heapless::String as HString;

/// Maximum length for short config strings (device names)
pub const MAX_SHORT_STRING: usize = 32;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Create a ShortString from a &str, truncating at a character boundary if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    for c in s.chars() {
        if hs.push(c).is_err() {
            break;
        }
    }
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete controller configuration
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Relay interlock thresholds
    pub safety: SafetyConfig,
    /// Countdown and auto-start behaviour
    pub schedule: ScheduleConfig,
    /// Settings record placement
    pub storage: StorageConfig,
    /// Character display geometry and timing
    pub display: DisplayConfig,
    /// Encoder decoding parameters
    pub input: InputConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set safety configuration
    pub fn with_safety(mut self, safety: SafetyConfig) -> Self {
        self.safety = safety;
        self
    }

    /// Set schedule configuration
    pub fn with_schedule(mut self, schedule: ScheduleConfig) -> Self {
        self.schedule = schedule;
        self
    }

    /// Set storage configuration
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Set display configuration
    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }

    /// Set input configuration
    pub fn with_input(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// Safety Config
// ============================================================================

/// Relay interlock thresholds.
///
/// Activation requires `voltage >= min_voltage_volts` and
/// `min_current_amps <= current <= max_current_amps`; a running pump trips
/// when `current > max_current_amps`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SafetyConfig {
    /// Undervoltage lockout threshold (volts)
    pub min_voltage_volts: i16,
    /// Undercurrent lockout threshold (amps)
    pub min_current_amps: i16,
    /// Overcurrent trip threshold (amps)
    pub max_current_amps: i16,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            min_voltage_volts: 50,
            min_current_amps: 4,
            max_current_amps: 15,
        }
    }
}

impl SafetyConfig {
    /// Set the undervoltage lockout threshold
    pub fn with_min_voltage_volts(mut self, volts: i16) -> Self {
        self.min_voltage_volts = volts;
        self
    }

    /// Set the undercurrent lockout threshold
    pub fn with_min_current_amps(mut self, amps: i16) -> Self {
        self.min_current_amps = amps;
        self
    }

    /// Set the overcurrent trip threshold
    pub fn with_max_current_amps(mut self, amps: i16) -> Self {
        self.max_current_amps = amps;
        self
    }
}

// ============================================================================
// Schedule Config
// ============================================================================

/// Countdown and auto-start configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleConfig {
    /// Monotonic time between countdown decrements
    pub countdown_step_ms: u64,
    /// Duration used when the stored one is out of range (erased storage)
    pub default_duration_minutes: u8,
    /// Resume an interrupted run at boot when the stored duration is nonzero
    pub resume_after_power_loss: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            countdown_step_ms: 60_000,
            default_duration_minutes: 20,
            resume_after_power_loss: true,
        }
    }
}

impl ScheduleConfig {
    /// Set the countdown step interval
    pub fn with_countdown_step_ms(mut self, ms: u64) -> Self {
        self.countdown_step_ms = ms.max(1);
        self
    }

    /// Set the fallback duration (wrapped into 0-60)
    pub fn with_default_duration_minutes(mut self, minutes: u8) -> Self {
        self.default_duration_minutes = minutes % 61;
        self
    }

    /// Enable or disable power-loss recovery
    pub fn with_resume_after_power_loss(mut self, resume: bool) -> Self {
        self.resume_after_power_loss = resume;
        self
    }
}

// ============================================================================
// Storage Config
// ============================================================================

/// Settings record placement
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageConfig {
    /// Byte offset of the first record field
    pub base_address: usize,
}

impl StorageConfig {
    /// Set the record base address
    pub fn with_base_address(mut self, address: usize) -> Self {
        self.base_address = address;
        self
    }
}

// ============================================================================
// Display Config
// ============================================================================

/// Character display configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayConfig {
    /// Characters per row
    pub columns: u8,
    /// Number of rows
    pub rows: u8,
    /// How long transient notices stay up
    pub notice_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            columns: 16,
            rows: 2,
            notice_ms: 2000,
        }
    }
}

impl DisplayConfig {
    /// Set the display geometry
    pub fn with_size(mut self, columns: u8, rows: u8) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    /// Set the notice duration
    pub fn with_notice_ms(mut self, ms: u64) -> Self {
        self.notice_ms = ms;
        self
    }
}

// ============================================================================
// Input Config
// ============================================================================

/// Encoder decoding parameters.
///
/// All times are in milliseconds and are converted to service ticks using
/// `service_period_ms`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputConfig {
    /// Quadrature transitions per mechanical detent
    pub steps_per_notch: u8,
    /// Button state must be stable this long to count
    pub debounce_ms: u32,
    /// Window for the second click of a double click
    pub double_click_ms: u32,
    /// Press duration that counts as a hold
    pub hold_ms: u32,
    /// Period of the encoder service timer
    pub service_period_ms: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            steps_per_notch: 4,
            debounce_ms: 10,
            double_click_ms: 600,
            hold_ms: 1200,
            service_period_ms: 1,
        }
    }
}

impl InputConfig {
    /// Set the quadrature steps per detent
    pub fn with_steps_per_notch(mut self, steps: u8) -> Self {
        self.steps_per_notch = steps.max(1);
        self
    }

    /// Set the double-click window
    pub fn with_double_click_ms(mut self, ms: u32) -> Self {
        self.double_click_ms = ms;
        self
    }

    /// Set the hold threshold
    pub fn with_hold_ms(mut self, ms: u32) -> Self {
        self.hold_ms = ms;
        self
    }

    /// Set the service timer period
    pub fn with_service_period_ms(mut self, ms: u32) -> Self {
        self.service_period_ms = ms.max(1);
        self
    }

    /// Converts a duration to whole service ticks (at least one).
    pub fn ticks(&self, ms: u32) -> u32 {
        (ms / self.service_period_ms.max(1)).max(1)
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name, shown on the boot splash
    pub name: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("pump timer"),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.safety.min_voltage_volts, 50);
        assert_eq!(config.safety.min_current_amps, 4);
        assert_eq!(config.safety.max_current_amps, 15);
        assert_eq!(config.schedule.countdown_step_ms, 60_000);
        assert_eq!(config.schedule.default_duration_minutes, 20);
        assert_eq!(config.display.columns, 16);
        assert_eq!(config.storage.base_address, 0);
    }

    #[test]
    fn default_duration_wraps_into_range() {
        let schedule = ScheduleConfig::default().with_default_duration_minutes(75);
        assert_eq!(schedule.default_duration_minutes, 14);
    }

    #[test]
    fn input_ticks_conversion() {
        let input = InputConfig::default().with_service_period_ms(2);
        assert_eq!(input.ticks(600), 300);
        assert_eq!(input.ticks(0), 1);
    }

    #[test]
    fn short_string_truncation() {
        let long_input = "a".repeat(100);
        let s = short_string(&long_input);
        assert_eq!(s.len(), MAX_SHORT_STRING);
    }

    #[test]
    fn short_string_keeps_char_boundaries() {
        let input = "é".repeat(40);
        let s = short_string(&input);
        assert!(s.len() <= MAX_SHORT_STRING);
        assert!(s.chars().all(|c| c == 'é'));
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_safety(SafetyConfig::default().with_max_current_amps(12))
            .with_storage(StorageConfig::default().with_base_address(32))
            .with_device(DeviceConfig::default().with_name("Well pump"));

        assert_eq!(config.safety.max_current_amps, 12);
        assert_eq!(config.storage.base_address, 32);
        assert_eq!(config.device.name.as_str(), "Well pump");
    }
}
