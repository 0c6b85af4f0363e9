//! Monotonic and wall-clock time on the ESP32.

use std::time::{Duration, SystemTime, SystemTimeError, UNIX_EPOCH};

use esp_idf_hal::sys::EspError;

use crate::traits::{Clock, ClockReading, TimeSource};

const SECONDS_PER_DAY: i64 = 86_400;

/// Monotonic milliseconds since boot from `esp_timer_get_time()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Esp32Clock;

impl Esp32Clock {
    /// Creates a new ESP32 clock instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for Esp32Clock {
    #[inline]
    fn now_ms(&self) -> u64 {
        // Safe: plain read of the 64-bit system timer.
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        (micros / 1000) as u64
    }
}

/// Time of day from the system clock.
///
/// The ESP32 RTC keeps counting across light sleep but not across a power
/// cut, so the clock has to be set after boot with [`set_epoch`]. The reading
/// is shifted by a fixed UTC offset; no daylight-saving rules are applied.
///
/// [`set_epoch`]: Self::set_epoch
///
/// # Example
///
/// ```ignore
/// use rs_pumptimer::hal::esp32::Esp32Rtc;
/// use rs_pumptimer::traits::TimeSource;
///
/// let mut rtc = Esp32Rtc::new(3600); // UTC+1
/// rtc.set_epoch(1_700_000_000)?;
/// let now = rtc.now()?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Esp32Rtc {
    utc_offset_secs: i32,
}

impl Esp32Rtc {
    /// Creates an RTC that reports local time at `utc_offset_secs`.
    pub fn new(utc_offset_secs: i32) -> Self {
        Self { utc_offset_secs }
    }

    /// Sets the system clock to `epoch_secs` (seconds since 1970, UTC).
    pub fn set_epoch(&mut self, epoch_secs: u64) -> Result<(), EspError> {
        let tv = esp_idf_hal::sys::timeval {
            tv_sec: epoch_secs as _,
            tv_usec: 0,
        };
        // Safe: `tv` outlives the call and a null timezone is allowed.
        let rc = unsafe { esp_idf_hal::sys::settimeofday(&tv, core::ptr::null()) };
        esp_idf_hal::sys::esp!(rc)?;
        log::info!("clock set to epoch {}", epoch_secs);
        Ok(())
    }

    /// Seconds since the epoch, UTC.
    pub fn epoch(&self) -> Result<Duration, SystemTimeError> {
        SystemTime::now().duration_since(UNIX_EPOCH)
    }
}

impl TimeSource for Esp32Rtc {
    type Error = SystemTimeError;

    fn now(&mut self) -> Result<ClockReading, Self::Error> {
        let local = self.epoch()?.as_secs() as i64 + i64::from(self.utc_offset_secs);
        Ok(ClockReading::from_seconds_of_day(
            local.rem_euclid(SECONDS_PER_DAY) as u32,
        ))
    }
}
