//! Settings editor state machine.
//!
//! The editor works on a draft copy of [`OperatingSettings`]; nothing is
//! persisted until the user confirms. It is a plain value stepped once per
//! control tick, so the relay safety evaluation keeps running while the user
//! edits.
//!
//! ```text
//! Time ─click─► Duration ─click─► Save ─click─► commit
//!                                  │ held
//!                                  ▼
//!                                Cancel ─click─► discard
//!                                  │ held
//!                                  ▼
//!                               DeleteAll ─click─► delete all
//!                                  │ held
//!                                  ▼
//!                                 Time
//! ```
//!
//! | Input | Time / Duration | Save | Cancel | DeleteAll |
//! |-------|-----------------|------|--------|-----------|
//! | Click | next state | commit | discard | delete all |
//! | Double click | commit | commit | commit | delete all |
//! | Held | next state | next state | next state | next state |
//! | Rotation | edit field | - | - | - |
//!
//! # Example
//!
//! ```rust
//! use rs_pumptimer::editor::{EditorOutcome, EditorState, SettingsEditor};
//! use rs_pumptimer::{ButtonEvent, OperatingSettings};
//!
//! let mut editor = SettingsEditor::open(&OperatingSettings::new(8, 0, 20));
//! assert_eq!(editor.state(), EditorState::Time);
//!
//! editor.step(ButtonEvent::Clicked, 0); // -> Duration
//! editor.step(ButtonEvent::None, 5); // 25 min
//! editor.step(ButtonEvent::Clicked, 0); // -> Save
//!
//! let outcome = editor.step(ButtonEvent::Clicked, 0);
//! assert_eq!(outcome, EditorOutcome::Save(OperatingSettings::new(8, 0, 25)));
//! ```

use crate::settings::OperatingSettings;
use crate::traits::ButtonEvent;

/// Editor cursor position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EditorState {
    /// Editing the scheduled start time.
    #[default]
    Time,
    /// Editing the run length.
    Duration,
    /// Confirm: save.
    Save,
    /// Confirm: discard.
    Cancel,
    /// Confirm: wipe all settings.
    DeleteAll,
}

impl EditorState {
    /// Next state in the fixed cycle.
    pub const fn next(self) -> Self {
        match self {
            EditorState::Time => EditorState::Duration,
            EditorState::Duration => EditorState::Save,
            EditorState::Save => EditorState::Cancel,
            EditorState::Cancel => EditorState::DeleteAll,
            EditorState::DeleteAll => EditorState::Time,
        }
    }

    /// Returns true when rotation edits a numeric field in this state.
    pub const fn edits_field(self) -> bool {
        matches!(self, EditorState::Time | EditorState::Duration)
    }
}

/// Result of stepping the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorOutcome {
    /// Still editing.
    Continue,
    /// Commit these settings and leave the editor.
    Save(OperatingSettings),
    /// Leave without writing.
    Cancel,
    /// Wipe all persisted settings and leave.
    DeleteAll,
}

impl EditorOutcome {
    /// Returns true if the editor is finished.
    pub const fn exits(&self) -> bool {
        !matches!(self, EditorOutcome::Continue)
    }
}

/// Modal settings editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsEditor {
    state: EditorState,
    draft: OperatingSettings,
}

impl SettingsEditor {
    /// Opens the editor on a copy of `current`, cursor on [`EditorState::Time`].
    pub fn open(current: &OperatingSettings) -> Self {
        Self {
            state: EditorState::Time,
            draft: *current,
        }
    }

    /// Current cursor position.
    pub fn state(&self) -> EditorState {
        self.state
    }

    /// The in-progress settings.
    pub fn draft(&self) -> &OperatingSettings {
        &self.draft
    }

    /// Applies one tick of input: rotation first, then the button.
    pub fn step(&mut self, button: ButtonEvent, delta: i32) -> EditorOutcome {
        self.apply_delta(delta);
        self.handle_button(button)
    }

    /// Applies an encoder delta to the field under the cursor.
    pub fn apply_delta(&mut self, delta: i32) {
        if delta == 0 {
            return;
        }
        match self.state {
            EditorState::Time => self.draft.scroll_time(delta),
            EditorState::Duration => self.draft.scroll_duration(delta),
            EditorState::Save | EditorState::Cancel | EditorState::DeleteAll => {}
        }
    }

    /// Handles a button gesture.
    pub fn handle_button(&mut self, button: ButtonEvent) -> EditorOutcome {
        match (button, self.state) {
            (ButtonEvent::None, _) => EditorOutcome::Continue,

            (ButtonEvent::Clicked, EditorState::Save) => EditorOutcome::Save(self.draft),
            (ButtonEvent::Clicked, EditorState::Cancel) => EditorOutcome::Cancel,
            (ButtonEvent::Clicked, EditorState::DeleteAll) => EditorOutcome::DeleteAll,
            (ButtonEvent::Clicked, _) => {
                self.state = self.state.next();
                EditorOutcome::Continue
            }

            (ButtonEvent::DoubleClicked, EditorState::DeleteAll) => EditorOutcome::DeleteAll,
            (ButtonEvent::DoubleClicked, _) => EditorOutcome::Save(self.draft),

            (ButtonEvent::Held, _) => {
                self.state = self.state.next();
                EditorOutcome::Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> SettingsEditor {
        SettingsEditor::open(&OperatingSettings::new(8, 0, 20))
    }

    fn editor_at(state: EditorState) -> SettingsEditor {
        let mut e = editor();
        while e.state() != state {
            e.handle_button(ButtonEvent::Held);
        }
        e
    }

    #[test]
    fn opens_on_time_with_copy_of_settings() {
        let e = editor();
        assert_eq!(e.state(), EditorState::Time);
        assert_eq!(*e.draft(), OperatingSettings::new(8, 0, 20));
    }

    #[test]
    fn state_cycle_order() {
        let mut s = EditorState::Time;
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(s);
            s = s.next();
        }
        assert_eq!(
            seen,
            vec![
                EditorState::Time,
                EditorState::Duration,
                EditorState::Save,
                EditorState::Cancel,
                EditorState::DeleteAll
            ]
        );
        assert_eq!(s, EditorState::Time);
    }

    #[test]
    fn click_advances_from_field_states() {
        let mut e = editor();
        assert_eq!(e.handle_button(ButtonEvent::Clicked), EditorOutcome::Continue);
        assert_eq!(e.state(), EditorState::Duration);
        assert_eq!(e.handle_button(ButtonEvent::Clicked), EditorOutcome::Continue);
        assert_eq!(e.state(), EditorState::Save);
    }

    #[test]
    fn click_on_confirmations() {
        let mut e = editor_at(EditorState::Save);
        assert_eq!(
            e.handle_button(ButtonEvent::Clicked),
            EditorOutcome::Save(OperatingSettings::new(8, 0, 20))
        );

        let mut e = editor_at(EditorState::Cancel);
        assert_eq!(e.handle_button(ButtonEvent::Clicked), EditorOutcome::Cancel);

        let mut e = editor_at(EditorState::DeleteAll);
        assert_eq!(e.handle_button(ButtonEvent::Clicked), EditorOutcome::DeleteAll);
    }

    #[test]
    fn double_click_saves_everywhere_but_delete_all() {
        for state in [
            EditorState::Time,
            EditorState::Duration,
            EditorState::Save,
            EditorState::Cancel,
        ] {
            let mut e = editor_at(state);
            assert!(matches!(
                e.handle_button(ButtonEvent::DoubleClicked),
                EditorOutcome::Save(_)
            ));
        }

        let mut e = editor_at(EditorState::DeleteAll);
        assert_eq!(
            e.handle_button(ButtonEvent::DoubleClicked),
            EditorOutcome::DeleteAll
        );
    }

    #[test]
    fn held_walks_the_full_cycle() {
        let mut e = editor_at(EditorState::DeleteAll);
        assert_eq!(e.handle_button(ButtonEvent::Held), EditorOutcome::Continue);
        assert_eq!(e.state(), EditorState::Time);
    }

    #[test]
    fn rotation_in_time_moves_hour_and_minute_together() {
        let mut e = editor();
        e.apply_delta(2);
        assert_eq!(*e.draft(), OperatingSettings::new(10, 2, 20));
        e.apply_delta(-3);
        assert_eq!(*e.draft(), OperatingSettings::new(7, 59, 20));
    }

    #[test]
    fn rotation_in_duration_wraps_mod_61() {
        let mut e = editor_at(EditorState::Duration);
        e.apply_delta(40);
        assert_eq!(e.draft().duration_minutes, 60);
        e.apply_delta(1);
        assert_eq!(e.draft().duration_minutes, 0);
        e.apply_delta(-1);
        assert_eq!(e.draft().duration_minutes, 60);
    }

    #[test]
    fn rotation_ignored_on_confirmations() {
        for state in [EditorState::Save, EditorState::Cancel, EditorState::DeleteAll] {
            let mut e = editor_at(state);
            e.apply_delta(7);
            assert_eq!(*e.draft(), OperatingSettings::new(8, 0, 20));
        }
    }

    #[test]
    fn step_applies_rotation_before_button() {
        let mut e = editor_at(EditorState::Duration);
        e.handle_button(ButtonEvent::Clicked);
        assert_eq!(e.state(), EditorState::Save);

        let mut e = editor_at(EditorState::Duration);
        let outcome = e.step(ButtonEvent::DoubleClicked, 5);
        assert_eq!(outcome, EditorOutcome::Save(OperatingSettings::new(8, 0, 25)));
    }

    #[test]
    fn outcome_exits() {
        assert!(!EditorOutcome::Continue.exits());
        assert!(EditorOutcome::Cancel.exits());
        assert!(EditorOutcome::DeleteAll.exits());
    }
}
