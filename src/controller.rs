//! Top-level pump controller.
//!
//! [`PumpController`] aggregates every piece of runtime state: the relay
//! safety controller, the active settings, the persisted-settings repository,
//! the display, and the current UI mode. The firmware main loop owns one
//! instance and calls [`tick`](PumpController::tick) with fresh readings.
//!
//! # Tick order
//!
//! 1. Latch the clock reading and sensor snapshot, turn the encoder position
//!    into a delta.
//! 2. Emergency stop asserted: spend any schedule edge, force the relay off,
//!    redraw, done.
//! 3. Dispatch the button gesture and delta to the current [`Mode`].
//! 4. Run the relay evaluation (countdown, interlocks, schedule, recovery).
//! 5. Redraw.
//!
//! The editor and the notice are modes of one flat state machine, so step 4
//! runs on every tick no matter what the user is doing.
//!
//! # Example
//!
//! ```rust
//! use rs_pumptimer::{ButtonEvent, ClockReading, Config, PumpController, SensorReadings, TickInput};
//! use rs_pumptimer::hal::{MockDisplay, MockEeprom, MockRelay};
//! use rs_pumptimer::settings::OperatingSettings;
//!
//! let mut pump = PumpController::boot(
//!     MockRelay::new(),
//!     MockEeprom::new(),
//!     MockDisplay::new(16, 2),
//!     Config::default(),
//! )
//! .unwrap();
//! pump.set_settings(OperatingSettings::new(8, 0, 20));
//!
//! let input = TickInput {
//!     clock: ClockReading::new(12, 0, 0),
//!     button: ButtonEvent::Clicked,
//!     sensors: SensorReadings::new(5, 52),
//!     ..TickInput::default()
//! };
//! pump.tick(&input).unwrap();
//!
//! assert!(pump.relay().is_on());
//! assert_eq!(pump.display().line(1), "20 min      5 A");
//! ```

use core::fmt;

use log::{error, info, warn};

use crate::config::Config;
use crate::editor::{EditorOutcome, SettingsEditor};
use crate::presenter::{self, Frame, StatusView, View};
use crate::relay::{RelayController, RelayEvent, TripReason};
use crate::sampler::TickSampler;
use crate::settings::{OperatingSettings, SettingsRepository};
use crate::traits::{
    ButtonEvent, CharDisplay, Clock, ClockReading, EmergencyInput, InputSource, RelayOutput,
    SensorReadings, SensorSource, SettingsStore, TimeSource,
};

/// Top row of the delete-all notice.
pub const DELETED_NOTICE_TOP: &str = "All settings";

/// Bottom row of the delete-all notice.
pub const DELETED_NOTICE_BOTTOM: &str = "deleted.";

/// Everything the loop samples for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Wall-clock time of day.
    pub clock: ClockReading,
    /// Monotonic milliseconds.
    pub now_ms: u64,
    /// Gesture taken from the input mailbox.
    pub button: ButtonEvent,
    /// Absolute encoder position in detents.
    pub encoder_position: i32,
    /// Emergency stop asserted.
    pub emergency: bool,
    /// Live supply readings.
    pub sensors: SensorReadings,
}

/// UI mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Status screen; click toggles the relay.
    #[default]
    Status,
    /// Settings editor open.
    Editing(SettingsEditor),
    /// Transient message shown until `until_ms` or any button.
    Notice {
        /// Monotonic time the notice expires.
        until_ms: u64,
    },
}

/// Peripheral failure surfaced by [`PumpController`].
///
/// Parameterized over the relay, store, and display error types.
#[derive(Debug, PartialEq, Eq)]
pub enum ControlError<R, S, D> {
    /// Relay output failed.
    Relay(R),
    /// Settings store failed.
    Storage(S),
    /// Display failed.
    Display(D),
}

impl<R: fmt::Debug, S: fmt::Debug, D: fmt::Debug> fmt::Display for ControlError<R, S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::Relay(e) => write!(f, "relay output error: {:?}", e),
            ControlError::Storage(e) => write!(f, "settings store error: {:?}", e),
            ControlError::Display(e) => write!(f, "display error: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<R: fmt::Debug, S: fmt::Debug, D: fmt::Debug> std::error::Error for ControlError<R, S, D> {}

/// Error type returned by a [`PumpController`] over `R`, `S`, `D`.
pub type PumpError<R, S, D> = ControlError<
    <R as RelayOutput>::Error,
    <S as SettingsStore>::Error,
    <D as CharDisplay>::Error,
>;

/// The pump controller.
///
/// # Type Parameters
///
/// - `R`: relay output ([`RelayOutput`])
/// - `S`: settings storage ([`SettingsStore`])
/// - `D`: character display ([`CharDisplay`])
pub struct PumpController<R: RelayOutput, S: SettingsStore, D: CharDisplay> {
    relay: RelayController<R>,
    repository: SettingsRepository<S>,
    display: D,
    config: Config,
    settings: OperatingSettings,
    mode: Mode,
    clock: ClockReading,
    sensors: SensorReadings,
    last_position: Option<i32>,
    emergency: bool,
}

impl<R: RelayOutput, S: SettingsStore, D: CharDisplay> PumpController<R, S, D> {
    /// Boots the controller.
    ///
    /// Loads the persisted record, drives the relay off, and arms a one-shot
    /// resume of the stored run when power-loss recovery is enabled.
    pub fn boot(relay: R, store: S, display: D, config: Config) -> Result<Self, PumpError<R, S, D>> {
        let mut repository = SettingsRepository::new(store, config.storage.base_address);
        let record = repository.load().map_err(ControlError::Storage)?;
        let settings = record.settings(config.schedule.default_duration_minutes);

        let mut relay = RelayController::new(relay, &config);
        relay.init().map_err(ControlError::Relay)?;

        if config.schedule.resume_after_power_loss {
            if let Some(minutes) = record.interrupted_run_minutes() {
                relay.arm_recovery(minutes);
            }
        }

        info!(
            "{} booted: start {:02}:{:02}, run {} min",
            config.device.name, settings.scheduled_hour, settings.scheduled_minute, settings.duration_minutes
        );

        Ok(Self {
            relay,
            repository,
            display,
            sensors: record.sensors(),
            config,
            settings,
            mode: Mode::Status,
            clock: ClockReading::default(),
            last_position: None,
            emergency: false,
        })
    }

    /// Runs one control tick.
    ///
    /// Returns the relay transition the tick caused. A storage failure while
    /// saving or deleting is reported only after the relay evaluation and the
    /// redraw have run, so safety never waits on the store.
    pub fn tick(&mut self, input: &TickInput) -> Result<Option<RelayEvent>, PumpError<R, S, D>> {
        self.clock = input.clock;
        self.sensors = input.sensors;
        let delta = self.take_delta(input.encoder_position);

        if input.emergency != self.emergency {
            self.emergency = input.emergency;
            if input.emergency {
                error!("emergency stop asserted");
            } else {
                warn!("emergency stop released");
            }
        }

        if input.emergency {
            self.relay.observe_clock(input.clock, &self.settings);
            let event = self
                .relay
                .force_off(TripReason::Emergency)
                .map_err(ControlError::Relay)?;
            return self.finish(event, Ok(()));
        }

        let dispatched = self.dispatch(input.button, delta, input.now_ms);

        let event = self
            .relay
            .evaluate_tick(input.clock, input.now_ms, input.sensors, &self.settings)
            .map_err(ControlError::Relay)?;

        self.finish(event, dispatched)
    }

    /// Samples the input peripherals and runs one tick on the result.
    ///
    /// This is the firmware loop body. A failed clock read repeats the last
    /// reading; see [`TickSampler::sample`].
    pub fn poll<T, I, E, N, C>(
        &mut self,
        inputs: &mut TickSampler<T, I, E, N, C>,
    ) -> Result<Option<RelayEvent>, PumpError<R, S, D>>
    where
        T: TimeSource,
        T::Error: fmt::Debug,
        I: InputSource,
        E: EmergencyInput,
        N: SensorSource,
        N::Error: fmt::Debug,
        C: Clock,
    {
        let input = inputs.sample(self.clock);
        self.tick(&input)
    }

    /// Replaces the active settings without persisting them.
    pub fn set_settings(&mut self, settings: OperatingSettings) {
        self.settings = settings;
    }

    /// Active settings.
    pub fn settings(&self) -> &OperatingSettings {
        &self.settings
    }

    /// Current UI mode.
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// The relay safety controller.
    pub fn relay(&self) -> &RelayController<R> {
        &self.relay
    }

    /// The settings repository.
    pub fn repository(&self) -> &SettingsRepository<S> {
        &self.repository
    }

    /// Get a reference to the display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Get a mutable reference to the display.
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Runtime configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Latest sensor snapshot (the persisted one until the first tick).
    pub fn sensors(&self) -> SensorReadings {
        self.sensors
    }

    /// Latest clock reading.
    pub fn clock(&self) -> ClockReading {
        self.clock
    }

    /// Composes what the display currently shows.
    pub fn frame(&self) -> Frame {
        presenter::compose(&self.view())
    }

    // ── Internal ──────────────────────────────────────────────────

    fn take_delta(&mut self, position: i32) -> i32 {
        let delta = self
            .last_position
            .map_or(0, |last| position.wrapping_sub(last));
        self.last_position = Some(position);
        delta
    }

    fn dispatch(&mut self, button: ButtonEvent, delta: i32, now_ms: u64) -> Result<(), PumpError<R, S, D>> {
        match self.mode {
            Mode::Status => match button {
                ButtonEvent::Clicked => self.relay.request_toggle(),
                ButtonEvent::DoubleClicked => {
                    info!("settings editor opened");
                    self.mode = Mode::Editing(SettingsEditor::open(&self.settings));
                }
                ButtonEvent::Held => self.delete_all(now_ms)?,
                ButtonEvent::None => {}
            },
            Mode::Editing(_) => self.step_editor(button, delta, now_ms)?,
            Mode::Notice { until_ms } => {
                if button.is_some() || now_ms >= until_ms {
                    self.mode = Mode::Status;
                }
            }
        }
        Ok(())
    }

    fn step_editor(&mut self, button: ButtonEvent, delta: i32, now_ms: u64) -> Result<(), PumpError<R, S, D>> {
        let Mode::Editing(editor) = &mut self.mode else {
            return Ok(());
        };

        match editor.step(button, delta) {
            EditorOutcome::Continue => {}
            EditorOutcome::Save(draft) => {
                if let Err(e) = self.repository.save(&draft, self.sensors) {
                    error!("saving settings failed, editor left open");
                    return Err(ControlError::Storage(e));
                }
                self.settings = draft;
                self.mode = Mode::Status;
            }
            EditorOutcome::Cancel => {
                info!("settings edit cancelled");
                self.mode = Mode::Status;
            }
            EditorOutcome::DeleteAll => self.delete_all(now_ms)?,
        }
        Ok(())
    }

    fn delete_all(&mut self, now_ms: u64) -> Result<(), PumpError<R, S, D>> {
        if let Err(e) = self.repository.delete_all() {
            error!("deleting settings failed");
            return Err(ControlError::Storage(e));
        }
        self.settings = OperatingSettings::zeroed();
        self.mode = Mode::Notice {
            until_ms: now_ms.saturating_add(self.config.display.notice_ms),
        };
        Ok(())
    }

    /// Redraws, then reports the first deferred failure.
    ///
    /// When the tick fails, its relay transition is still logged and stays
    /// readable through [`RelayController::last_event`].
    fn finish(
        &mut self,
        event: Option<RelayEvent>,
        dispatched: Result<(), PumpError<R, S, D>>,
    ) -> Result<Option<RelayEvent>, PumpError<R, S, D>> {
        let outcome = dispatched.and(self.render());
        if let (Err(_), Some(event)) = (&outcome, event) {
            error!("tick failed after relay event {:?}", event);
        }
        outcome.map(|()| event)
    }

    fn view(&self) -> View<'_> {
        match &self.mode {
            Mode::Status => View::Status(StatusView {
                clock: self.clock,
                relay: self.relay.state(),
                settings: self.settings,
                sensors: self.sensors,
            }),
            Mode::Editing(editor) => View::Settings(editor),
            Mode::Notice { .. } => View::Notice(DELETED_NOTICE_TOP, DELETED_NOTICE_BOTTOM),
        }
    }

    fn render(&mut self) -> Result<(), PumpError<R, S, D>> {
        let frame = self.frame();
        presenter::draw(&mut self.display, &frame).map_err(ControlError::Display)
    }
}
