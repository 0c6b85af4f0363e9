//! Supply current and voltage sensing via the ESP32 ADC.
//!
//! Both channels sit on ADC1 (GPIO4 current, GPIO3 voltage); ADC2 is not
//! usable reliably on the C3.
//!
//! # Calibration
//!
//! Readings are scaled linearly from the 12-bit raw value. The full-scale
//! figures depend on the transducer and the divider, so measure a known load
//! and supply and adjust [`SensorCalibration`].

use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::adc::ADC1;
use esp_idf_hal::gpio::{Gpio3, Gpio4};
use esp_idf_hal::peripheral::Peripheral;

use crate::traits::{SensorReadings, SensorSource};

/// Largest raw 12-bit ADC value.
const ADC_MAX: i32 = 4095;

/// Linear scaling from raw ADC counts to amps and volts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorCalibration {
    /// Amps at a full-scale current reading.
    pub current_full_scale_amps: i16,
    /// Volts at a full-scale voltage reading.
    pub voltage_full_scale_volts: i16,
}

impl Default for SensorCalibration {
    fn default() -> Self {
        Self {
            current_full_scale_amps: 30,
            voltage_full_scale_volts: 80,
        }
    }
}

impl SensorCalibration {
    /// Converts raw counts to whole units, rounding down.
    fn scale(raw: u16, full_scale: i16) -> i16 {
        let raw = i32::from(raw).min(ADC_MAX);
        (raw * i32::from(full_scale) / ADC_MAX) as i16
    }
}

/// Current and voltage sensors on ADC1.
///
/// # Example
///
/// ```ignore
/// use rs_pumptimer::hal::esp32::{Esp32Sensors, SensorCalibration};
/// use rs_pumptimer::traits::SensorSource;
///
/// let peripherals = Peripherals::take()?;
/// let adc1 = AdcDriver::new(peripherals.adc1)?;
/// let mut sensors = Esp32Sensors::new(
///     &adc1,
///     peripherals.pins.gpio4,
///     peripherals.pins.gpio3,
///     SensorCalibration::default(),
/// )?;
/// let readings = sensors.read_sensors()?;
/// ```
pub struct Esp32Sensors<'d> {
    current: AdcChannelDriver<'d, Gpio4, &'d AdcDriver<'d, ADC1>>,
    voltage: AdcChannelDriver<'d, Gpio3, &'d AdcDriver<'d, ADC1>>,
    calibration: SensorCalibration,
}

impl<'d> Esp32Sensors<'d> {
    /// Creates both ADC channels with 11 dB attenuation (0-3.1 V range).
    ///
    /// # Errors
    ///
    /// Returns an error if ADC channel initialization fails.
    pub fn new(
        adc: &'d AdcDriver<'d, ADC1>,
        current_pin: impl Peripheral<P = Gpio4> + 'd,
        voltage_pin: impl Peripheral<P = Gpio3> + 'd,
        calibration: SensorCalibration,
    ) -> Result<Self, esp_idf_hal::sys::EspError> {
        let config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };

        Ok(Self {
            current: AdcChannelDriver::new(adc, current_pin, &config)?,
            voltage: AdcChannelDriver::new(adc, voltage_pin, &config)?,
            calibration,
        })
    }
}

impl SensorSource for Esp32Sensors<'_> {
    type Error = esp_idf_hal::sys::EspError;

    fn read_sensors(&mut self) -> Result<SensorReadings, Self::Error> {
        let current = self.current.read()?;
        let voltage = self.voltage.read()?;
        Ok(SensorReadings::new(
            SensorCalibration::scale(current, self.calibration.current_full_scale_amps),
            SensorCalibration::scale(voltage, self.calibration.voltage_full_scale_volts),
        ))
    }
}
