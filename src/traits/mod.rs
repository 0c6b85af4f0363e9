//! Trait definitions for the peripherals the pump controller drives.
//!
//! The control core never touches hardware directly. Everything it reads or
//! writes goes through one of these capability traits, so the same
//! [`PumpController`](crate::PumpController) runs against the mocks in
//! [`crate::hal::mock`] on a desktop and against the ESP32 drivers on the
//! board.
//!
//! # Submodules
//!
//! - `hardware`: relay output, emergency input, encoder input, RTC, sensors, clock
//! - `display`: character display sink
//! - `storage`: fixed-offset settings store (EEPROM-style)

pub mod display;
pub mod hardware;
pub mod storage;

pub use display::*;
pub use hardware::*;
pub use storage::*;
