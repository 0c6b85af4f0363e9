//! KY-040 rotary encoder serviced from a periodic timer.
//!
//! A 1 ms `esp_timer` callback samples CLK, DT and SW, runs them through
//! [`EncoderDecoder`], and publishes into a `'static` [`SharedEncoder`]. The
//! control loop reads the shared encoder and never touches the pins.
//!
//! # Wiring
//!
//! - CLK (A) → GPIO6
//! - DT (B) → GPIO7
//! - SW → GPIO10
//! - VCC → 3.3V
//! - GND → GND

use core::time::Duration;

use esp_idf_hal::gpio::{InputPin, OutputPin, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_svc::timer::{EspTaskTimerService, EspTimer};

use crate::config::InputConfig;
use crate::input::{EncoderDecoder, SharedEncoder};

/// Running encoder service.
///
/// Dropping it stops the timer; the pins stay owned by the callback.
///
/// # Example
///
/// ```ignore
/// use rs_pumptimer::hal::esp32::Esp32Encoder;
/// use rs_pumptimer::input::SharedEncoder;
/// use rs_pumptimer::traits::InputSource;
///
/// static ENCODER: SharedEncoder = SharedEncoder::new();
///
/// let peripherals = Peripherals::take()?;
/// let _service = Esp32Encoder::start(
///     peripherals.pins.gpio6,  // CLK
///     peripherals.pins.gpio7,  // DT
///     peripherals.pins.gpio10, // SW
///     &InputConfig::default(),
///     &ENCODER,
/// )?;
///
/// let mut input = &ENCODER;
/// loop {
///     let position = input.position();
///     let button = input.poll_button();
/// }
/// ```
pub struct Esp32Encoder {
    _timer: EspTimer<'static>,
    _service: EspTaskTimerService,
}

impl Esp32Encoder {
    /// Configures the pins with pull-ups and starts the service timer.
    ///
    /// # Errors
    ///
    /// Returns an error if GPIO or timer initialization fails.
    pub fn start<CLK, DT, SW>(
        clk_pin: impl Peripheral<P = CLK> + 'static,
        dt_pin: impl Peripheral<P = DT> + 'static,
        sw_pin: impl Peripheral<P = SW> + 'static,
        config: &InputConfig,
        shared: &'static SharedEncoder,
    ) -> Result<Self, esp_idf_hal::sys::EspError>
    where
        CLK: InputPin + OutputPin,
        DT: InputPin + OutputPin,
        SW: InputPin + OutputPin,
    {
        let mut clk = PinDriver::input(clk_pin)?;
        let mut dt = PinDriver::input(dt_pin)?;
        let mut sw = PinDriver::input(sw_pin)?;

        // KY-040 outputs are open-drain
        clk.set_pull(Pull::Up)?;
        dt.set_pull(Pull::Up)?;
        sw.set_pull(Pull::Up)?;

        let mut decoder = EncoderDecoder::new(config);
        let service = EspTaskTimerService::new()?;
        let timer = service.timer(move || {
            decoder.service(clk.is_high(), dt.is_high(), sw.is_low(), shared);
        })?;
        timer.every(Duration::from_millis(u64::from(config.service_period_ms.max(1))))?;

        log::info!(
            "encoder service running every {} ms",
            config.service_period_ms.max(1)
        );

        Ok(Self {
            _timer: timer,
            _service: service,
        })
    }
}
