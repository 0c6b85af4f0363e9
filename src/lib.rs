//! # rs-pumptimer
//!
//! A scheduled pump relay controller: a relay runs a pump for a set number of
//! minutes, started by hand, at a daily time, or after a power cut, and is
//! cut off by supply interlocks or an emergency stop. A rotary encoder with a
//! push button and a two-row character display form the user interface;
//! settings persist in an EEPROM-style store.
//!
//! ## Features
//!
//! - **Safety interlocks**: overcurrent trip, undervoltage/undercurrent start
//!   lockout, emergency stop that bypasses everything else
//! - **Daily schedule**: auto-start at a configured hour and minute
//! - **Power-loss recovery**: one resume attempt at boot
//! - **Settings editor**: start time and run length, save/cancel/delete-all
//! - **Bit-compatible storage**: the five-field record older boards wrote
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Peripheral abstractions (relay, inputs, RTC, sensors, display, store)
//! - `settings` - Operating settings and the persisted record
//! - `relay` - Countdown, interlocks, schedule and recovery
//! - `editor` - Settings editor state machine
//! - `input` - Encoder decoder and the timer-to-loop handoff
//! - `presenter` - Two-row text rendering
//! - `controller` - Main controller that ties everything together
//! - `sampler` - Reads the input peripherals once per tick
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Countdown unit
//!
//! The countdown starts at `duration × 60` and drops by one every
//! [`ScheduleConfig::countdown_step_ms`](config::ScheduleConfig) (60 s by
//! default), so with stock settings a 20 minute run reads 1200 at the start
//! and 1199 a minute later. Boards in the field behave this way; shorten the
//! step to make the countdown track real seconds.
//!
//! ## Example
//!
//! ```rust
//! use rs_pumptimer::{
//!     ButtonEvent, ClockReading, Config, OperatingSettings, PumpController, SensorReadings,
//!     TickInput,
//!     hal::{MockDisplay, MockEeprom, MockRelay},
//! };
//!
//! let mut pump = PumpController::boot(
//!     MockRelay::new(),
//!     MockEeprom::new(),
//!     MockDisplay::new(16, 2),
//!     Config::default(),
//! )
//! .unwrap();
//! pump.set_settings(OperatingSettings::new(6, 30, 15));
//!
//! // The clock reaches the scheduled minute with a healthy supply.
//! let tick = TickInput {
//!     clock: ClockReading::new(6, 30, 0),
//!     sensors: SensorReadings::new(5, 55),
//!     ..TickInput::default()
//! };
//! pump.tick(&tick).unwrap();
//! assert!(pump.relay().is_on());
//!
//! // Emergency stop wins over everything.
//! pump.tick(&TickInput { emergency: true, button: ButtonEvent::Clicked, ..tick }).unwrap();
//! assert!(!pump.relay().is_on());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Shared configuration system for desktop and ESP32.
pub mod config;
/// Main pump controller that coordinates input, safety, storage and display.
pub mod controller;
/// Settings editor state machine.
pub mod editor;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Rotary encoder decoding and the shared timer-to-loop state.
pub mod input;
/// Display rendering of controller state.
pub mod presenter;
/// Relay safety controller.
pub mod relay;
/// Per-tick peripheral sampling.
pub mod sampler;
/// Operating settings and persistence.
pub mod settings;
/// Core traits for hardware abstraction.
pub mod traits;

// Re-exports for convenience
pub use controller::{ControlError, Mode, PumpController, PumpError, TickInput};
pub use editor::{EditorOutcome, EditorState, SettingsEditor};
pub use relay::{ActivationSource, RelayController, RelayEvent, RelayState, TripReason};
pub use sampler::TickSampler;
pub use settings::{OperatingSettings, PersistedRecord, SettingsRepository};
pub use traits::{
    ButtonEvent, CharDisplay, Clock, ClockReading, EmergencyInput, InputSource, RelayOutput,
    SensorReadings, SensorSource, SettingsStore, TimeSource,
};

// Config re-exports
pub use config::{
    Config, DeviceConfig, DisplayConfig, InputConfig, SafetyConfig, ScheduleConfig, StorageConfig,
};
