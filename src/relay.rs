//! Relay safety controller: countdown, auto-start, and interlocks.
//!
//! [`RelayController`] owns the relay output and the only copy of
//! [`RelayState`]. It is evaluated once per control tick and decides whether
//! the pump runs.
//!
//! # Rules
//!
//! Activation (countdown = duration × 60) happens on a manual toggle, at the
//! first second of the scheduled minute, or once at boot to resume a run
//! interrupted by a power cut. Every activation is gated by the supply
//! lockout: undervoltage, undercurrent, and a current already above the trip
//! threshold all refuse the start.
//!
//! Deactivation happens when the countdown runs out, on overcurrent, on
//! emergency stop, or on a manual toggle. Trips are never retried; only a new
//! activation that passes every gate turns the pump back on.
//!
//! # Example
//!
//! ```rust
//! use rs_pumptimer::relay::{RelayController, RelayEvent, ActivationSource};
//! use rs_pumptimer::hal::MockRelay;
//! use rs_pumptimer::{ClockReading, Config, OperatingSettings, SensorReadings};
//!
//! let mut relay = RelayController::new(MockRelay::new(), &Config::default());
//! let settings = OperatingSettings::new(8, 0, 20);
//! let sensors = SensorReadings::new(5, 52);
//! let now = ClockReading::new(12, 0, 0);
//!
//! relay.request_toggle();
//! let event = relay.evaluate_tick(now, 0, sensors, &settings).unwrap();
//! assert_eq!(event, Some(RelayEvent::Activated(ActivationSource::Manual)));
//! assert_eq!(relay.state().remaining_seconds, 1200);
//!
//! relay.evaluate_tick(now, 60_000, sensors, &settings).unwrap();
//! assert_eq!(relay.state().remaining_seconds, 1199);
//! ```

use crate::config::{Config, SafetyConfig};
use crate::settings::OperatingSettings;
use crate::traits::{ClockReading, RelayOutput, SensorReadings};
use log::{error, info, warn};

/// Relay run state.
///
/// While `is_on` is false the countdown is frozen. A countdown that reaches
/// zero always ends with `is_on == false` by the end of the same evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayState {
    /// Whether the relay is energized.
    pub is_on: bool,
    /// Monotonic time the next countdown step is measured from.
    pub anchor_ms: u64,
    /// Countdown value (see the crate docs for its unit).
    pub remaining_seconds: i32,
}

/// What started a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActivationSource {
    /// Button click in the status view.
    Manual,
    /// Daily scheduled start time reached.
    Schedule,
    /// Resuming a run interrupted by a power cut.
    PowerLossRecovery,
}

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TripReason {
    /// Countdown reached zero.
    Expired,
    /// Current above the trip threshold.
    Overcurrent,
    /// Emergency stop asserted.
    Emergency,
    /// Button click while running.
    Manual,
}

impl TripReason {
    /// Returns true for trips caused by an interlock rather than normal use.
    pub const fn is_safety_trip(self) -> bool {
        matches!(self, TripReason::Overcurrent | TripReason::Emergency)
    }
}

/// Relay transition produced by one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RelayEvent {
    /// The relay turned on.
    Activated(ActivationSource),
    /// The relay turned off.
    Deactivated(TripReason),
    /// An activation was refused by the supply lockout.
    Blocked(ActivationSource),
}

/// Relay safety controller.
///
/// # Type Parameter
///
/// - `R`: The relay output implementation ([`RelayOutput`] trait)
pub struct RelayController<R: RelayOutput> {
    output: R,
    state: RelayState,
    safety: SafetyConfig,
    step_ms: u64,
    toggle_requested: bool,
    recovery_minutes: Option<u8>,
    last_schedule_hit: Option<ClockReading>,
    last_event: Option<RelayEvent>,
}

impl<R: RelayOutput> RelayController<R> {
    /// Creates a controller with the relay assumed off.
    ///
    /// Call [`init`](Self::init) before the first tick to drive the pin to a
    /// known state.
    pub fn new(output: R, config: &Config) -> Self {
        Self {
            output,
            state: RelayState::default(),
            safety: config.safety.clone(),
            step_ms: config.schedule.countdown_step_ms.max(1),
            toggle_requested: false,
            recovery_minutes: None,
            last_schedule_hit: None,
            last_event: None,
        }
    }

    /// Drives the relay output low.
    pub fn init(&mut self) -> Result<(), R::Error> {
        self.output.set_relay(false)
    }

    /// Requests a manual on/off toggle, applied at the next evaluation.
    pub fn request_toggle(&mut self) {
        self.toggle_requested = true;
    }

    /// Arms a one-shot resume of an interrupted run of `minutes`.
    ///
    /// The next evaluation tries to start it (subject to the supply lockout)
    /// and disarms it either way.
    pub fn arm_recovery(&mut self, minutes: u8) {
        if minutes > 0 {
            warn!("power loss recovery armed: {} min", minutes);
            self.recovery_minutes = Some(minutes);
        }
    }

    /// Tracks the schedule edge without acting on it.
    ///
    /// For ticks that skip [`evaluate_tick`](Self::evaluate_tick). A
    /// scheduled second seen here is spent and does not fire on a later
    /// evaluation within the same second.
    pub fn observe_clock(&mut self, now: ClockReading, settings: &OperatingSettings) {
        self.schedule_edge(now, settings);
    }

    /// Forces the relay off immediately.
    ///
    /// Always writes the output, even if the relay is already off, and drops
    /// any pending toggle or recovery. Returns the deactivation event if the
    /// relay was on.
    pub fn force_off(&mut self, reason: TripReason) -> Result<Option<RelayEvent>, R::Error> {
        self.toggle_requested = false;
        self.recovery_minutes = None;

        if self.state.is_on {
            self.state.is_on = false;
            log_trip(reason, self.state.remaining_seconds);
            let event = RelayEvent::Deactivated(reason);
            self.last_event = Some(event);
            self.output.set_relay(false)?;
            return Ok(Some(event));
        }

        self.output.set_relay(false)?;
        Ok(None)
    }

    /// Runs one evaluation and returns the transition it caused, if any.
    ///
    /// `now_ms` is monotonic time; `now` is the wall-clock reading used for
    /// the schedule.
    pub fn evaluate_tick(
        &mut self,
        now: ClockReading,
        now_ms: u64,
        sensors: SensorReadings,
        settings: &OperatingSettings,
    ) -> Result<Option<RelayEvent>, R::Error> {
        let toggle = core::mem::take(&mut self.toggle_requested);
        let recovery = self.recovery_minutes.take();
        let schedule_due = self.schedule_edge(now, settings);

        let event = if self.state.is_on {
            self.evaluate_running(toggle, now_ms, sensors)
        } else {
            let request = if toggle {
                Some((ActivationSource::Manual, settings.duration_minutes))
            } else if schedule_due {
                Some((ActivationSource::Schedule, settings.duration_minutes))
            } else {
                recovery.map(|minutes| (ActivationSource::PowerLossRecovery, minutes))
            };

            match request {
                Some((source, minutes)) => self.try_activate(source, minutes, now_ms, sensors),
                None => None,
            }
        };

        if let Some(event) = event {
            self.last_event = Some(event);
            match event {
                RelayEvent::Activated(_) => self.output.set_relay(true)?,
                RelayEvent::Deactivated(_) => self.output.set_relay(false)?,
                RelayEvent::Blocked(_) => {}
            }
        }

        Ok(event)
    }

    /// Current relay state.
    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Whether the relay is energized.
    pub fn is_on(&self) -> bool {
        self.state.is_on
    }

    /// Most recent transition, kept for diagnostics.
    pub fn last_event(&self) -> Option<RelayEvent> {
        self.last_event
    }

    /// Whether a power-loss recovery is waiting for the next evaluation.
    pub fn recovery_pending(&self) -> bool {
        self.recovery_minutes.is_some()
    }

    /// Get a reference to the relay output.
    pub fn output(&self) -> &R {
        &self.output
    }

    /// Get a mutable reference to the relay output.
    pub fn output_mut(&mut self) -> &mut R {
        &mut self.output
    }

    /// Returns true when the supply allows a start.
    ///
    /// A start at a current the running check would trip on is refused, so
    /// the relay never closes for a single tick.
    pub fn supply_ok(&self, sensors: SensorReadings) -> bool {
        sensors.voltage_volts >= self.safety.min_voltage_volts
            && sensors.current_amps >= self.safety.min_current_amps
            && sensors.current_amps <= self.safety.max_current_amps
    }

    // ── Internal ──────────────────────────────────────────────────

    fn evaluate_running(
        &mut self,
        toggle: bool,
        now_ms: u64,
        sensors: SensorReadings,
    ) -> Option<RelayEvent> {
        if sensors.current_amps > self.safety.max_current_amps {
            error!(
                "overcurrent: {} A > {} A",
                sensors.current_amps, self.safety.max_current_amps
            );
            return Some(self.deactivate(TripReason::Overcurrent));
        }

        if toggle {
            return Some(self.deactivate(TripReason::Manual));
        }

        // One step per evaluation; a late tick catches up on the following ones.
        if now_ms.saturating_sub(self.state.anchor_ms) >= self.step_ms {
            self.state.remaining_seconds -= 1;
            self.state.anchor_ms += self.step_ms;
        }

        if self.state.remaining_seconds <= 0 {
            return Some(self.deactivate(TripReason::Expired));
        }

        None
    }

    fn try_activate(
        &mut self,
        source: ActivationSource,
        minutes: u8,
        now_ms: u64,
        sensors: SensorReadings,
    ) -> Option<RelayEvent> {
        if minutes == 0 {
            info!("{:?} start ignored: duration is 0", source);
            return None;
        }

        if !self.supply_ok(sensors) {
            warn!(
                "{:?} start blocked: {} V / {} A (need >= {} V, {}-{} A)",
                source,
                sensors.voltage_volts,
                sensors.current_amps,
                self.safety.min_voltage_volts,
                self.safety.min_current_amps,
                self.safety.max_current_amps
            );
            return Some(RelayEvent::Blocked(source));
        }

        self.state = RelayState {
            is_on: true,
            anchor_ms: now_ms,
            remaining_seconds: i32::from(minutes) * 60,
        };
        info!(
            "relay on ({:?}), countdown {}",
            source, self.state.remaining_seconds
        );
        Some(RelayEvent::Activated(source))
    }

    fn deactivate(&mut self, reason: TripReason) -> RelayEvent {
        self.state.is_on = false;
        log_trip(reason, self.state.remaining_seconds);
        RelayEvent::Deactivated(reason)
    }

    /// True only on the first evaluation that sees the scheduled start second.
    fn schedule_edge(&mut self, now: ClockReading, settings: &OperatingSettings) -> bool {
        if !now.is_start_of(settings.scheduled_hour, settings.scheduled_minute) {
            self.last_schedule_hit = None;
            return false;
        }
        let fresh = self.last_schedule_hit != Some(now);
        self.last_schedule_hit = Some(now);
        fresh
    }
}

fn log_trip(reason: TripReason, remaining: i32) {
    if reason.is_safety_trip() {
        error!("relay off ({:?}), {} remaining discarded", reason, remaining);
    } else {
        info!("relay off ({:?})", reason);
    }
}
