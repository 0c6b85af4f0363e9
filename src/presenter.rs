//! Display presenter: turns controller state into two text rows.
//!
//! Rendering is split in two steps. [`compose`] is a pure function from a
//! [`View`] to a [`Frame`] of text rows. [`render`] clears the display and
//! writes the frame. No state survives between calls, so every render is a
//! full clear-and-redraw.
//!
//! # Layouts (16 × 2)
//!
//! ```text
//! Status, off         Status, running     Settings (Duration)  Settings (Save)
//! ┌────────────────┐  ┌────────────────┐  ┌────────────────┐  ┌────────────────┐
//! │08:05 OFF  52 V │  │08:05 ON   52 V │  │ T 08:00 >D 20m │  │ T 08:00  D 20m │
//! │20 min      5 A │  │20 min      5 A │  │SAVE    CANCEL  │  │SAVE ✓  CANCEL  │
//! └────────────────┘  └────────────────┘  └────────────────┘  └────────────────┘
//! ```

use core::fmt::Write;

use crate::editor::{EditorState, SettingsEditor};
use crate::relay::RelayState;
use crate::settings::OperatingSettings;
use crate::traits::{CharDisplay, ClockReading, SensorReadings};

/// Number of text rows a frame holds.
pub const FRAME_ROWS: usize = 2;

/// Byte capacity of one rendered row (room for multi-byte glyphs).
pub const LINE_CAPACITY: usize = 32;

/// Glyph marking the SAVE confirmation.
pub const CHECK_GLYPH: char = '\u{2713}';

/// Glyph marking the CANCEL confirmation.
pub const CANCEL_GLYPH: char = 'X';

/// One rendered text row.
pub type Line = heapless::String<LINE_CAPACITY>;

/// Snapshot rendered by the status view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusView {
    /// Current time of day.
    pub clock: ClockReading,
    /// Relay state; only the running flag is shown.
    pub relay: RelayState,
    /// Active settings.
    pub settings: OperatingSettings,
    /// Latest supply readings.
    pub sensors: SensorReadings,
}

/// What the display should show.
#[derive(Clone, Copy, Debug)]
pub enum View<'a> {
    /// Default status screen.
    Status(StatusView),
    /// Settings editor.
    Settings(&'a SettingsEditor),
    /// Transient two-line message.
    Notice(&'static str, &'static str),
}

/// Fully composed screen contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    /// Text rows, top to bottom.
    pub lines: [Line; FRAME_ROWS],
}

impl Frame {
    /// Returns a row as a string slice.
    pub fn line(&self, row: usize) -> &str {
        self.lines.get(row).map(|l| l.as_str()).unwrap_or("")
    }
}

/// Composes the frame for a view.
pub fn compose(view: &View<'_>) -> Frame {
    match view {
        View::Status(status) => compose_status(status),
        View::Settings(editor) => compose_settings(editor),
        View::Notice(top, bottom) => {
            let mut frame = Frame::default();
            let _ = frame.lines[0].push_str(top);
            let _ = frame.lines[1].push_str(bottom);
            frame
        }
    }
}

/// Clears `display` and draws `view`.
pub fn render<D: CharDisplay>(display: &mut D, view: &View<'_>) -> Result<(), D::Error> {
    draw(display, &compose(view))
}

/// Clears `display` and writes an already composed frame.
pub fn draw<D: CharDisplay>(display: &mut D, frame: &Frame) -> Result<(), D::Error> {
    display.clear()?;
    for (row, line) in frame.lines.iter().enumerate() {
        display.write_line(row as u8, line)?;
    }
    Ok(())
}

fn compose_status(status: &StatusView) -> Frame {
    let mut frame = Frame::default();
    let run = if status.relay.is_on { "ON" } else { "OFF" };

    // Overflow only truncates the row; the LCD would clip it anyway.
    let _ = write!(
        frame.lines[0],
        "{:02}:{:02} {:<3} {:>3} V",
        status.clock.hour, status.clock.minute, run, status.sensors.voltage_volts
    );

    let _ = write!(
        frame.lines[1],
        "{:>2} min    {:>3} A",
        status.settings.duration_minutes, status.sensors.current_amps
    );

    frame
}

fn compose_settings(editor: &SettingsEditor) -> Frame {
    let mut frame = Frame::default();
    let draft = editor.draft();
    let state = editor.state();
    let cursor = |selected: bool| if selected { '>' } else { ' ' };

    let _ = write!(
        frame.lines[0],
        "{}T {:02}:{:02} {}D {:>2}m",
        cursor(state == EditorState::Time),
        draft.scheduled_hour,
        draft.scheduled_minute,
        cursor(state == EditorState::Duration),
        draft.duration_minutes
    );

    let _ = if state == EditorState::DeleteAll {
        write!(frame.lines[1], "DELETE ALL?   {}", CHECK_GLYPH)
    } else {
        let save = if state == EditorState::Save { CHECK_GLYPH } else { ' ' };
        let cancel = if state == EditorState::Cancel { CANCEL_GLYPH } else { ' ' };
        write!(frame.lines[1], "SAVE {}  CANCEL {}", save, cancel)
    };

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockDisplay;
    use crate::traits::ButtonEvent;

    fn status(on: bool) -> StatusView {
        StatusView {
            clock: ClockReading::new(8, 5, 42),
            relay: RelayState {
                is_on: on,
                anchor_ms: 0,
                remaining_seconds: if on { 1199 } else { 0 },
            },
            settings: OperatingSettings::new(8, 0, 20),
            sensors: SensorReadings::new(5, 52),
        }
    }

    fn editor_in(state: EditorState) -> SettingsEditor {
        let mut e = SettingsEditor::open(&OperatingSettings::new(8, 0, 20));
        while e.state() != state {
            e.handle_button(ButtonEvent::Held);
        }
        e
    }

    #[test]
    fn status_view_idle() {
        let frame = compose(&View::Status(status(false)));
        assert_eq!(frame.line(0), "08:05 OFF  52 V");
        assert_eq!(frame.line(1), "20 min      5 A");
    }

    #[test]
    fn status_view_running_keeps_duration_row() {
        let frame = compose(&View::Status(status(true)));
        assert_eq!(frame.line(0), "08:05 ON   52 V");
        assert_eq!(frame.line(1), "20 min      5 A");
    }

    #[test]
    fn status_view_zero_pads_time() {
        let mut view = status(false);
        view.clock = ClockReading::new(0, 7, 0);
        assert!(compose(&View::Status(view)).line(0).starts_with("00:07"));
    }

    #[test]
    fn settings_cursor_follows_field() {
        let e = editor_in(EditorState::Time);
        assert_eq!(compose(&View::Settings(&e)).line(0), ">T 08:00  D 20m");

        let e = editor_in(EditorState::Duration);
        assert_eq!(compose(&View::Settings(&e)).line(0), " T 08:00 >D 20m");

        let e = editor_in(EditorState::Save);
        assert_eq!(compose(&View::Settings(&e)).line(0), " T 08:00  D 20m");
    }

    #[test]
    fn confirmation_row_marks() {
        let e = editor_in(EditorState::Time);
        assert_eq!(compose(&View::Settings(&e)).line(1), "SAVE    CANCEL  ");

        let e = editor_in(EditorState::Save);
        assert_eq!(compose(&View::Settings(&e)).line(1), "SAVE \u{2713}  CANCEL  ");

        let e = editor_in(EditorState::Cancel);
        assert_eq!(compose(&View::Settings(&e)).line(1), "SAVE    CANCEL X");

        let e = editor_in(EditorState::DeleteAll);
        assert_eq!(compose(&View::Settings(&e)).line(1), "DELETE ALL?   \u{2713}");
    }

    #[test]
    fn rows_fit_sixteen_columns() {
        for view in [View::Status(status(false)), View::Status(status(true))] {
            let frame = compose(&view);
            assert!(frame.lines.iter().all(|l| l.chars().count() <= 16));
        }
        for state in [EditorState::Time, EditorState::Save, EditorState::DeleteAll] {
            let e = editor_in(state);
            let frame = compose(&View::Settings(&e));
            assert!(frame.lines.iter().all(|l| l.chars().count() <= 16));
        }
    }

    #[test]
    fn render_clears_then_writes_rows() {
        let mut lcd = MockDisplay::new(16, 2);
        lcd.write_line(0, "stale text here!").unwrap();

        render(&mut lcd, &View::Notice("All settings", "deleted.")).unwrap();

        assert_eq!(lcd.clear_count, 1);
        assert_eq!(lcd.line(0), "All settings");
        assert_eq!(lcd.line(1), "deleted.");
    }

    #[test]
    fn render_is_stateless() {
        let mut lcd = MockDisplay::new(16, 2);
        render(&mut lcd, &View::Status(status(true))).unwrap();
        let first = (lcd.line(0), lcd.line(1));

        render(&mut lcd, &View::Status(status(true))).unwrap();
        assert_eq!((lcd.line(0), lcd.line(1)), first);
        assert_eq!(lcd.clear_count, 2);
    }
}
