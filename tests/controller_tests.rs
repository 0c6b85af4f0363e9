//! End-to-end behaviour of the pump controller against the mock peripherals.

mod common;

use common::{Bench, VOLTAGE_OK};
use rs_pumptimer::hal::MockEeprom;
use rs_pumptimer::settings::{SettingsRepository, RECORD_SIZE};
use rs_pumptimer::{
    ActivationSource, ButtonEvent, Config, EditorState, Mode, OperatingSettings, RelayEvent,
    SensorReadings, TripReason,
};

// ============================================================================
// Relay scenarios
// ============================================================================

#[test]
fn manual_start_counts_down() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));

    let event = bench.press(ButtonEvent::Clicked);
    assert_eq!(event, Some(RelayEvent::Activated(ActivationSource::Manual)));
    assert!(bench.energized());
    assert_eq!(bench.remaining(), 1200);

    bench.advance_ms(60_000);
    bench.tick();
    assert_eq!(bench.remaining(), 1199);
    assert!(bench.relay_on());
}

#[test]
fn overcurrent_trips_on_next_tick() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.press(ButtonEvent::Clicked);

    bench.inputs.sensors.readings.current_amps = 16;
    let event = bench.tick();

    assert_eq!(event, Some(RelayEvent::Deactivated(TripReason::Overcurrent)));
    assert!(!bench.energized());

    // Not retried once the current falls back.
    bench.inputs.sensors.readings.current_amps = 5;
    assert_eq!(bench.tick(), None);
    assert!(!bench.relay_on());
}

#[test]
fn schedule_starts_full_run() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.inputs.rtc = rs_pumptimer::hal::MockRtc::at(7, 59, 59);
    bench.inputs.sensors.readings = SensorReadings::new(5, 55);

    assert_eq!(bench.tick(), None);

    bench.inputs.rtc.advance_seconds(1);
    bench.advance_ms(1_000);
    let event = bench.tick();

    assert_eq!(event, Some(RelayEvent::Activated(ActivationSource::Schedule)));
    assert_eq!(bench.remaining(), 1200);
}

#[test]
fn emergency_cuts_running_pump_same_tick() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.press(ButtonEvent::Clicked);
    assert!(bench.energized());

    bench.inputs.emergency.asserted = true;
    let event = bench.tick();

    assert_eq!(event, Some(RelayEvent::Deactivated(TripReason::Emergency)));
    assert!(!bench.energized());
}

#[test]
fn countdown_runs_out() {
    let config = Config::default().with_schedule(
        rs_pumptimer::ScheduleConfig::default().with_countdown_step_ms(10),
    );
    let mut bench = Bench::boot(MockEeprom::new(), config);
    bench.pump.set_settings(OperatingSettings::new(8, 0, 1));
    bench.press(ButtonEvent::Clicked);

    let mut last = None;
    for _ in 0..60 {
        bench.advance_ms(10);
        if let Some(event) = bench.tick() {
            last = Some(event);
        }
    }

    assert_eq!(last, Some(RelayEvent::Deactivated(TripReason::Expired)));
    assert!(!bench.energized());
    assert_eq!(bench.screen().1, " 1 min      5 A");
}

// ============================================================================
// Settings editor
// ============================================================================

#[test]
fn edit_and_save_persists_values() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));

    bench.press(ButtonEvent::DoubleClicked);
    assert!(matches!(bench.pump.mode(), Mode::Editing(_)));

    bench.turn(2); // 10:02
    bench.press(ButtonEvent::Clicked); // -> Duration
    bench.turn(-5); // 15 min
    bench.press(ButtonEvent::Clicked); // -> Save
    assert_eq!(bench.screen().1, "SAVE \u{2713}  CANCEL");

    bench.press(ButtonEvent::Clicked);

    let expected = OperatingSettings::new(10, 2, 15);
    assert_eq!(*bench.pump.mode(), Mode::Status);
    assert_eq!(*bench.pump.settings(), expected);

    // A fresh boot-time load sees the same values.
    let store = bench.pump.repository().store().clone();
    let record = SettingsRepository::new(store, 0).load().unwrap();
    assert_eq!(record.settings(20), expected);
    assert_eq!(record.sensors(), SensorReadings::new(5, VOLTAGE_OK));
}

#[test]
fn saved_settings_survive_reboot() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.press(ButtonEvent::DoubleClicked);
    bench.turn(-8); // 00:52
    bench.press(ButtonEvent::DoubleClicked); // quick save

    let store = bench.pump.repository().store().clone();
    let config = Config::default()
        .with_schedule(rs_pumptimer::ScheduleConfig::default().with_resume_after_power_loss(false));
    let rebooted = Bench::boot(store, config);

    assert_eq!(*rebooted.pump.settings(), OperatingSettings::new(0, 52, 20));
}

#[test]
fn editor_screen_tracks_cursor() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.press(ButtonEvent::DoubleClicked);
    assert_eq!(bench.screen().0, ">T 08:00  D 20m");

    bench.press(ButtonEvent::Clicked);
    assert_eq!(bench.screen().0, " T 08:00 >D 20m");

    bench.press(ButtonEvent::Held);
    bench.press(ButtonEvent::Held);
    assert_eq!(bench.screen().1, "SAVE    CANCEL X");

    bench.press(ButtonEvent::Held);
    assert_eq!(bench.screen().1, "DELETE ALL?   \u{2713}");
}

#[test]
fn delete_all_from_editor_shows_notice() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.press(ButtonEvent::DoubleClicked);
    for _ in 0..4 {
        bench.press(ButtonEvent::Held);
    }
    match bench.pump.mode() {
        Mode::Editing(editor) => assert_eq!(editor.state(), EditorState::DeleteAll),
        other => panic!("unexpected mode {:?}", other),
    }

    bench.press(ButtonEvent::Clicked);

    assert!(matches!(bench.pump.mode(), Mode::Notice { .. }));
    assert_eq!(bench.screen(), ("All settings".into(), "deleted.".into()));
    assert_eq!(*bench.pump.settings(), OperatingSettings::zeroed());
    assert!(bench.pump.repository().store().bytes[..RECORD_SIZE]
        .iter()
        .all(|&b| b == 0));
}

// ============================================================================
// Status view
// ============================================================================

#[test]
fn status_screen_idle_and_running() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.tick();
    assert_eq!(
        bench.screen(),
        ("12:00 OFF  52 V".into(), "20 min      5 A".into())
    );

    bench.press(ButtonEvent::Clicked);
    assert_eq!(
        bench.screen(),
        ("12:00 ON   52 V".into(), "20 min      5 A".into())
    );
    assert_eq!(bench.remaining(), 1200);
}

#[test]
fn rotation_in_status_view_is_ignored() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.tick();
    bench.turn(7);
    assert_eq!(*bench.pump.settings(), OperatingSettings::new(8, 0, 20));

    // And does not leak into the editor once it opens.
    bench.press(ButtonEvent::DoubleClicked);
    bench.press(ButtonEvent::Clicked);
    bench.press(ButtonEvent::Clicked);
    bench.press(ButtonEvent::Clicked);
    assert_eq!(*bench.pump.settings(), OperatingSettings::new(8, 0, 20));
}
