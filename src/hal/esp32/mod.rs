//! ESP32-C3 SuperMini hardware abstraction layer for the pump timer.
//!
//! # Board
//!
//! - **MCU**: ESP32-C3 SuperMini
//! - **Relay**: opto-isolated relay module driving the pump contactor
//! - **Emergency stop**: latching mushroom switch, normally open, to ground
//! - **Sensors**: current transducer and supply voltage divider on ADC1
//! - **Encoder**: KY-040 module, serviced from a 1 ms timer
//! - **Display**: SSD1306 128x64 OLED (I2C), optional
//! - **Settings**: NVS partition standing in for the EEPROM
//!
//! GPIO numbers live in [`pins`].

mod console;
mod emergency;
mod encoder;
mod relay;
mod sensors;
mod storage;
mod time;

pub use console::ConsoleDisplay;
pub use emergency::Esp32Emergency;
pub use encoder::Esp32Encoder;
pub use relay::Esp32Relay;
pub use sensors::{Esp32Sensors, SensorCalibration};
pub use storage::{Esp32Storage, STORAGE_SIZE};
pub use time::{Esp32Clock, Esp32Rtc};

#[cfg(feature = "display")]
mod display;
#[cfg(feature = "display")]
pub use display::{DisplayError, Esp32Display};

/// GPIO numbers used by the pump timer board.
///
/// The main binary takes the pins from `Peripherals` by name; these constants
/// keep the wiring documented in one place.
pub mod pins {
    // =========================================================================
    // Pump
    // =========================================================================

    /// Relay coil driver output (active high)
    pub const RELAY: i32 = 2;

    /// Emergency stop input (active low, internal pull-up)
    pub const EMERGENCY: i32 = 5;

    // =========================================================================
    // Supply sensing (ADC1)
    // =========================================================================

    /// Current transducer output
    pub const CURRENT_SENSE: i32 = 4;

    /// Supply voltage divider tap
    pub const VOLTAGE_SENSE: i32 = 3;

    // =========================================================================
    // User interface
    // =========================================================================

    /// Encoder channel A
    pub const ENC_A: i32 = 6;

    /// Encoder channel B
    pub const ENC_B: i32 = 7;

    /// Encoder push switch (active low)
    pub const ENC_SWITCH: i32 = 10;

    /// Display I2C data (shares the onboard LED)
    pub const I2C_SDA: i32 = 8;

    /// Display I2C clock (shares the BOOT strap)
    pub const I2C_SCL: i32 = 9;

    /// SSD1306 bus address
    pub const OLED_ADDR: u8 = 0x3C;
}
