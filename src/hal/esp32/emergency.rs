//! Emergency stop switch input.

use esp_idf_hal::gpio::{Input, InputPin, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;

use crate::traits::EmergencyInput;

/// Normally-open switch to ground on a pulled-up GPIO (GPIO5).
///
/// A broken wire reads as released, so use a latching switch that also cuts
/// the contactor supply directly.
pub struct Esp32Emergency<'d, T: InputPin + OutputPin> {
    pin: PinDriver<'d, T, Input>,
}

impl<'d, T: InputPin + OutputPin> Esp32Emergency<'d, T> {
    /// Configures the pin as an input with the internal pull-up.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO initialization fails.
    pub fn new(pin: impl Peripheral<P = T> + 'd) -> Result<Self, esp_idf_hal::sys::EspError> {
        let mut pin = PinDriver::input(pin)?;
        pin.set_pull(Pull::Up)?;
        Ok(Self { pin })
    }
}

impl<T: InputPin + OutputPin> EmergencyInput for Esp32Emergency<'_, T> {
    fn is_asserted(&mut self) -> bool {
        self.pin.is_low()
    }
}
