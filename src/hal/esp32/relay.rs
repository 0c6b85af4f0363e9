//! Pump relay output on a GPIO.
//!
//! # Wiring
//!
//! - IN → GPIO2
//! - VCC → 5V
//! - GND → GND

use esp_idf_hal::gpio::{Output, OutputPin, PinDriver};
use esp_idf_hal::peripheral::Peripheral;

use crate::traits::RelayOutput;

/// Relay module driven from one GPIO.
///
/// Most opto-isolated modules switch on a high input; set `active_low` for
/// the ones that don't.
///
/// # Example
///
/// ```ignore
/// use rs_pumptimer::hal::esp32::Esp32Relay;
/// use rs_pumptimer::traits::RelayOutput;
///
/// let peripherals = Peripherals::take()?;
/// let mut relay = Esp32Relay::new(peripherals.pins.gpio2, false)?;
/// relay.set_relay(true)?;
/// ```
pub struct Esp32Relay<'d, T: OutputPin> {
    pin: PinDriver<'d, T, Output>,
    active_low: bool,
}

impl<'d, T: OutputPin> Esp32Relay<'d, T> {
    /// Configures the pin as an output with the relay released.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(
        pin: impl Peripheral<P = T> + 'd,
        active_low: bool,
    ) -> Result<Self, esp_idf_hal::sys::EspError> {
        let mut relay = Self {
            pin: PinDriver::output(pin)?,
            active_low,
        };
        relay.set_relay(false)?;
        Ok(relay)
    }

    /// Whether the coil is currently driven.
    pub fn is_energized(&self) -> bool {
        self.pin.is_set_high() != self.active_low
    }
}

impl<T: OutputPin> RelayOutput for Esp32Relay<'_, T> {
    type Error = esp_idf_hal::sys::EspError;

    fn set_relay(&mut self, on: bool) -> Result<(), Self::Error> {
        if on != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
    }
}
