//! ESP32-C3 SuperMini pump timer.
//!
//! This is the main entry point for the physical controller. It runs a 50Hz
//! control loop that:
//! - Reads the time of day, the supply sensors and the emergency stop
//! - Takes encoder position and button gestures from the timer-serviced decoder
//! - Runs one controller tick (safety, schedule, countdown, settings UI)
//! - Redraws the OLED, or logs screen changes when built without `display`
//!
//! # Build
//!
//! ```bash
//! # Relay, sensors, encoder, log console
//! cargo build --release --features esp32 --bin esp32_main
//!
//! # With the SSD1306 display
//! cargo build --release --features esp32,display --bin esp32_main
//! ```
//!
//! Set `PUMP_EPOCH` (seconds since 1970) at build time to seed the clock, and
//! `PUMP_UTC_OFFSET` (seconds) for the local time zone.

use esp_idf_hal::adc::oneshot::AdcDriver;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::log::EspLogger;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};
use rs_pumptimer::config::DeviceConfig;
use rs_pumptimer::hal::esp32::{
    Esp32Clock, Esp32Emergency, Esp32Encoder, Esp32Relay, Esp32Rtc, Esp32Sensors, Esp32Storage,
    SensorCalibration,
};
use rs_pumptimer::input::SharedEncoder;
use rs_pumptimer::{Config, PumpController, TickSampler};
use std::thread;
use std::time::Duration;

/// Main loop interval in milliseconds (50Hz = 20ms)
const LOOP_INTERVAL_MS: u64 = 20;

/// NVS namespace holding the settings blob.
const NVS_NAMESPACE: &str = "pumptimer";

/// Encoder state shared with the 1 ms service timer.
static ENCODER: SharedEncoder = SharedEncoder::new();

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    EspLogger::initialize_default();

    let config = Config::default()
        .with_device(DeviceConfig::default().with_name(option_env!("PUMP_NAME").unwrap_or("pump timer")));

    info!("================================");
    info!("  {}", config.device.name);
    info!("================================");

    let peripherals = Peripherals::take()?;

    // =========================================================================
    // Relay (GPIO2) and emergency stop (GPIO5)
    // =========================================================================
    let relay = Esp32Relay::new(peripherals.pins.gpio2, false)?;
    let emergency = Esp32Emergency::new(peripherals.pins.gpio5)?;
    info!("[OK] Relay GPIO2, emergency stop GPIO5");

    // =========================================================================
    // Supply sensors (ADC1 on GPIO4/3)
    // =========================================================================
    let adc1 = AdcDriver::new(peripherals.adc1)?;
    let sensors = Esp32Sensors::new(
        &adc1,
        peripherals.pins.gpio4,
        peripherals.pins.gpio3,
        SensorCalibration::default(),
    )?;
    info!("[OK] Sensors initialized (GPIO4 current, GPIO3 voltage)");

    // =========================================================================
    // Encoder (KY-040 on GPIO6/7/10), serviced from a 1 ms timer
    // =========================================================================
    let _encoder = Esp32Encoder::start(
        peripherals.pins.gpio6,
        peripherals.pins.gpio7,
        peripherals.pins.gpio10,
        &config.input,
        &ENCODER,
    )?;
    info!("[OK] Encoder initialized (GPIO6/7/10)");

    // =========================================================================
    // Settings store (NVS)
    // =========================================================================
    let store = Esp32Storage::new(EspDefaultNvsPartition::take()?, NVS_NAMESPACE)?;
    info!("[OK] Settings store (NVS namespace '{}')", NVS_NAMESPACE);

    // =========================================================================
    // Time
    // =========================================================================
    let utc_offset = option_env!("PUMP_UTC_OFFSET")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let mut rtc = Esp32Rtc::new(utc_offset);
    match option_env!("PUMP_EPOCH").and_then(|s| s.parse().ok()) {
        Some(epoch) => rtc.set_epoch(epoch)?,
        None => warn!("PUMP_EPOCH not set, clock starts at the epoch"),
    }
    let clock = Esp32Clock::new();

    // =========================================================================
    // Display (SSD1306 on GPIO8/9) or log console
    // =========================================================================
    #[cfg(feature = "display")]
    let display = {
        use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
        use esp_idf_hal::prelude::*;
        use rs_pumptimer::hal::esp32::Esp32Display;

        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio8, // SDA
            peripherals.pins.gpio9, // SCL
            &I2cConfig::new().baudrate(400.kHz().into()),
        )?;

        let disp = Esp32Display::new(i2c, config.display.columns)
            .map_err(|e| anyhow::anyhow!("Display init failed: {:?}", e))?;
        info!("[OK] Display initialized (GPIO8/9 I2C)");
        disp
    };

    #[cfg(not(feature = "display"))]
    let display = {
        use rs_pumptimer::hal::esp32::ConsoleDisplay;
        info!("[SKIP] No display feature, screen goes to the log");
        ConsoleDisplay::new(config.display.columns, config.display.rows)
    };

    // =========================================================================
    // Controller
    // =========================================================================
    let mut pump = PumpController::boot(relay, store, display, config)
        .map_err(|e| anyhow::anyhow!("boot failed: {}", e))?;

    info!("Controls:");
    info!("  Click:        start / stop the pump");
    info!("  Double click: edit start time and duration");
    info!("  Hold:         delete all settings");
    info!("Starting control loop (50Hz)...");

    let mut inputs = TickSampler::new(rtc, &ENCODER, emergency, sensors, clock);

    // =========================================================================
    // Main Control Loop (50Hz)
    // =========================================================================
    loop {
        match pump.poll(&mut inputs) {
            Ok(Some(event)) => info!("relay event: {:?}", event),
            Ok(None) => {}
            Err(e) => error!("tick failed: {}", e),
        }

        thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
    }
}
