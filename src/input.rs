//! Encoder decoding and the interrupt-to-main-loop handoff.
//!
//! [`EncoderDecoder`] runs on the periodic service timer (about every
//! millisecond). It turns raw quadrature and switch levels into detent counts
//! and button gestures and publishes them into a [`SharedEncoder`].
//!
//! [`SharedEncoder`] is the only state shared between the timer context and
//! the control loop. It is two atomics: a monotonic position counter and a
//! one-slot gesture mailbox. The control loop reads it through
//! [`InputSource`].
//!
//! # Example
//!
//! ```rust
//! use rs_pumptimer::input::{EncoderDecoder, SharedEncoder};
//! use rs_pumptimer::config::InputConfig;
//! use rs_pumptimer::traits::InputSource;
//! use rs_pumptimer::ButtonEvent;
//!
//! static ENCODER: SharedEncoder = SharedEncoder::new();
//!
//! let mut decoder = EncoderDecoder::new(&InputConfig::default());
//! // Timer context: one full quadrature cycle clockwise, button released.
//! for (a, b) in [(false, true), (false, false), (true, false), (true, true)] {
//!     decoder.service(a, b, false, &ENCODER);
//! }
//!
//! // Main loop
//! let mut input = &ENCODER;
//! assert_eq!(input.position(), 1);
//! assert_eq!(input.poll_button(), ButtonEvent::None);
//! ```

use core::sync::atomic::{AtomicI32, AtomicU8, Ordering};

use crate::config::InputConfig;
use crate::traits::{ButtonEvent, InputSource};

/// Quadrature transition table indexed by `(previous << 2) | current`.
///
/// Each entry is the sub-step direction: `+1`, `-1`, or `0` for no movement or
/// an invalid (bounced) transition.
const QUADRATURE_TABLE: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

/// Encoder state shared between the service timer and the control loop.
///
/// All accesses are single-word atomics; no locks.
#[derive(Debug)]
pub struct SharedEncoder {
    position: AtomicI32,
    button: AtomicU8,
}

impl SharedEncoder {
    /// Creates an encoder at position 0 with no pending gesture.
    pub const fn new() -> Self {
        Self {
            position: AtomicI32::new(0),
            button: AtomicU8::new(0),
        }
    }

    /// Adds detents to the position counter (timer context).
    #[inline]
    pub fn publish_steps(&self, steps: i32) {
        if steps != 0 {
            self.position.fetch_add(steps, Ordering::Release);
        }
    }

    /// Posts a gesture, replacing any unconsumed one (timer context).
    #[inline]
    pub fn publish_button(&self, event: ButtonEvent) {
        if event.is_some() {
            self.button.store(event.to_u8(), Ordering::Release);
        }
    }

    /// Reads the position counter.
    #[inline]
    pub fn load_position(&self) -> i32 {
        self.position.load(Ordering::Acquire)
    }

    /// Takes the pending gesture, leaving the mailbox empty.
    #[inline]
    pub fn take_button(&self) -> ButtonEvent {
        ButtonEvent::from_u8(self.button.swap(0, Ordering::AcqRel))
    }
}

impl Default for SharedEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for &SharedEncoder {
    fn poll_button(&mut self) -> ButtonEvent {
        self.take_button()
    }

    fn position(&mut self) -> i32 {
        self.load_position()
    }
}

/// Button gesture tracker, sampled on every service tick.
#[derive(Clone, Debug)]
struct ButtonTracker {
    debounce_ticks: u32,
    double_click_ticks: u32,
    hold_ticks: u32,
    /// Debounced level.
    pressed: bool,
    /// Ticks the raw level has disagreed with `pressed`.
    unstable_ticks: u32,
    /// Ticks the debounced level has been pressed.
    down_ticks: u32,
    /// A hold was reported for the current press.
    held: bool,
    /// Ticks left in the double-click window after a first release.
    pending_click: Option<u32>,
}

impl ButtonTracker {
    fn new(config: &InputConfig) -> Self {
        Self {
            debounce_ticks: config.ticks(config.debounce_ms),
            double_click_ticks: config.ticks(config.double_click_ms),
            hold_ticks: config.ticks(config.hold_ms),
            pressed: false,
            unstable_ticks: 0,
            down_ticks: 0,
            held: false,
            pending_click: None,
        }
    }

    fn sample(&mut self, raw_pressed: bool) -> ButtonEvent {
        if raw_pressed != self.pressed {
            self.unstable_ticks += 1;
            if self.unstable_ticks >= self.debounce_ticks {
                self.unstable_ticks = 0;
                self.pressed = raw_pressed;
                return if raw_pressed {
                    self.down_ticks = 0;
                    self.held = false;
                    ButtonEvent::None
                } else {
                    self.released()
                };
            }
        } else {
            self.unstable_ticks = 0;
        }

        if self.pressed {
            self.down_ticks = self.down_ticks.saturating_add(1);
            if !self.held && self.down_ticks >= self.hold_ticks {
                self.held = true;
                self.pending_click = None;
                return ButtonEvent::Held;
            }
            return ButtonEvent::None;
        }

        match self.pending_click {
            Some(0) | Some(1) => {
                self.pending_click = None;
                ButtonEvent::Clicked
            }
            Some(left) => {
                self.pending_click = Some(left - 1);
                ButtonEvent::None
            }
            None => ButtonEvent::None,
        }
    }

    fn released(&mut self) -> ButtonEvent {
        if self.held {
            return ButtonEvent::None;
        }
        if self.pending_click.take().is_some() {
            return ButtonEvent::DoubleClicked;
        }
        self.pending_click = Some(self.double_click_ticks);
        ButtonEvent::None
    }
}

/// Quadrature and button decoder serviced from the periodic timer.
///
/// Pure logic: the caller samples the pins and hands the levels in, so the
/// decoder runs identically on the board and in tests.
#[derive(Clone, Debug)]
pub struct EncoderDecoder {
    last_ab: u8,
    sub_steps: i32,
    steps_per_notch: i32,
    button: ButtonTracker,
}

impl EncoderDecoder {
    /// Creates a decoder assuming both channels idle high.
    pub fn new(config: &InputConfig) -> Self {
        Self {
            last_ab: 0b11,
            sub_steps: 0,
            steps_per_notch: i32::from(config.steps_per_notch.max(1)),
            button: ButtonTracker::new(config),
        }
    }

    /// Services one timer tick with the sampled pin levels.
    ///
    /// `a` and `b` are the raw channel levels, `pressed` the debounced-to-be
    /// switch state (already inverted for active-low wiring). Results are
    /// published into `shared`.
    pub fn service(&mut self, a: bool, b: bool, pressed: bool, shared: &SharedEncoder) {
        shared.publish_steps(self.sample_quadrature(a, b));
        shared.publish_button(self.button.sample(pressed));
    }

    /// Feeds one quadrature sample, returning whole detents completed.
    pub fn sample_quadrature(&mut self, a: bool, b: bool) -> i32 {
        let ab = (u8::from(a) << 1) | u8::from(b);
        let index = usize::from((self.last_ab << 2) | ab);
        self.last_ab = ab;
        self.sub_steps += i32::from(QUADRATURE_TABLE[index]);

        let notches = self.sub_steps / self.steps_per_notch;
        self.sub_steps -= notches * self.steps_per_notch;
        notches
    }

    /// Feeds one button sample, returning the gesture it completes.
    pub fn sample_button(&mut self, pressed: bool) -> ButtonEvent {
        self.button.sample(pressed)
    }
}
