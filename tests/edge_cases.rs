//! Edge case and boundary condition tests for the pump controller

mod common;

use common::Bench;
use rs_pumptimer::hal::{MockDisplay, MockEeprom, MockRelay};
use rs_pumptimer::settings::{PersistedRecord, SettingsRepository};
use rs_pumptimer::{
    ActivationSource, ButtonEvent, Config, ControlError, EditorState, Mode, OperatingSettings,
    PumpController, RelayEvent, SafetyConfig, ScheduleConfig, SensorReadings, TripReason,
};

fn store_with(settings: OperatingSettings) -> MockEeprom {
    let mut repo = SettingsRepository::new(MockEeprom::new(), 0);
    repo.save(&settings, SensorReadings::new(5, 52)).unwrap();
    repo.into_store()
}

// ============================================================================
// Safety keeps running while the user is busy
// ============================================================================

#[test]
fn overcurrent_trips_while_editing() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.press(ButtonEvent::Clicked);
    bench.press(ButtonEvent::DoubleClicked);
    assert!(matches!(bench.pump.mode(), Mode::Editing(_)));

    bench.inputs.sensors.readings.current_amps = 20;
    let event = bench.tick();

    assert_eq!(event, Some(RelayEvent::Deactivated(TripReason::Overcurrent)));
    assert!(matches!(bench.pump.mode(), Mode::Editing(_)));
}

#[test]
fn countdown_continues_while_editing() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.press(ButtonEvent::Clicked);
    bench.press(ButtonEvent::DoubleClicked);

    bench.advance_ms(60_000);
    bench.tick();
    assert_eq!(bench.remaining(), 1199);
}

#[test]
fn schedule_fires_while_editing() {
    let mut bench = Bench::with_settings(OperatingSettings::new(12, 0, 10));
    bench.inputs.rtc = rs_pumptimer::hal::MockRtc::at(11, 59, 58);
    bench.press(ButtonEvent::DoubleClicked);

    bench.inputs.rtc.advance_seconds(2);
    let event = bench.tick();
    assert_eq!(event, Some(RelayEvent::Activated(ActivationSource::Schedule)));
}

#[test]
fn emergency_while_editing_keeps_editor_and_ignores_buttons() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.press(ButtonEvent::Clicked);
    bench.press(ButtonEvent::DoubleClicked);

    bench.inputs.emergency.asserted = true;
    let event = bench.press(ButtonEvent::Clicked);
    assert_eq!(event, Some(RelayEvent::Deactivated(TripReason::Emergency)));

    bench.turn(5);
    match bench.pump.mode() {
        Mode::Editing(editor) => {
            assert_eq!(editor.state(), EditorState::Time);
            assert_eq!(*editor.draft(), OperatingSettings::new(8, 0, 20));
        }
        other => panic!("unexpected mode {:?}", other),
    }
}

#[test]
fn emergency_blocks_every_start_and_release_does_not_restart() {
    let mut bench = Bench::with_settings(OperatingSettings::new(12, 0, 20));
    bench.inputs.emergency.asserted = true;

    // Scheduled second and a manual click both land during the stop.
    assert_eq!(bench.press(ButtonEvent::Clicked), None);
    assert!(!bench.energized());

    bench.inputs.emergency.asserted = false;
    bench.inputs.rtc.advance_seconds(1);
    assert_eq!(bench.tick(), None);
    assert!(!bench.relay_on());
}

#[test]
fn release_within_scheduled_second_does_not_start() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.inputs.rtc = rs_pumptimer::hal::MockRtc::at(8, 0, 0);
    bench.inputs.emergency.asserted = true;
    assert_eq!(bench.tick(), None);

    // Same second, stop released.
    bench.inputs.emergency.asserted = false;
    bench.advance_ms(20);
    assert_eq!(bench.tick(), None);
    assert!(!bench.relay_on());
    assert!(!bench.energized());
}

#[test]
fn trip_during_notice() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.press(ButtonEvent::Clicked);
    bench.press(ButtonEvent::Held);
    assert!(matches!(bench.pump.mode(), Mode::Notice { .. }));

    bench.inputs.sensors.readings.current_amps = 30;
    assert_eq!(
        bench.tick(),
        Some(RelayEvent::Deactivated(TripReason::Overcurrent))
    );
}

// ============================================================================
// Supply lockout boundaries
// ============================================================================

#[test]
fn lockout_at_exact_thresholds() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.inputs.sensors.readings = SensorReadings::new(4, 50);
    assert_eq!(
        bench.press(ButtonEvent::Clicked),
        Some(RelayEvent::Activated(ActivationSource::Manual))
    );
}

#[test]
fn undervoltage_blocks_manual_start() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.inputs.sensors.readings = SensorReadings::new(5, 49);

    assert_eq!(
        bench.press(ButtonEvent::Clicked),
        Some(RelayEvent::Blocked(ActivationSource::Manual))
    );
    // Only the boot-time write reached the pin.
    assert_eq!(bench.pump.relay().output().writes, vec![false]);
}

#[test]
fn current_above_trip_blocks_manual_start() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.inputs.sensors.readings = SensorReadings::new(16, 52);

    assert_eq!(
        bench.press(ButtonEvent::Clicked),
        Some(RelayEvent::Blocked(ActivationSource::Manual))
    );
    assert_eq!(bench.pump.relay().output().writes, vec![false]);
}

#[test]
fn custom_thresholds_apply() {
    let config = Config::default().with_safety(
        SafetyConfig::default()
            .with_min_voltage_volts(20)
            .with_max_current_amps(8),
    );
    let mut bench = Bench::boot(MockEeprom::new(), config);
    bench.pump.set_settings(OperatingSettings::new(8, 0, 20));
    bench.inputs.sensors.readings = SensorReadings::new(5, 24);

    assert!(bench.press(ButtonEvent::Clicked).is_some());
    assert!(bench.relay_on());

    bench.inputs.sensors.readings.current_amps = 9;
    assert_eq!(
        bench.tick(),
        Some(RelayEvent::Deactivated(TripReason::Overcurrent))
    );
}

#[test]
fn zero_duration_click_does_nothing() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 0));
    assert_eq!(bench.press(ButtonEvent::Clicked), None);
    assert!(!bench.relay_on());
}

// ============================================================================
// Boot and power-loss recovery
// ============================================================================

#[test]
fn boot_resumes_interrupted_run() {
    let mut bench = Bench::boot(store_with(OperatingSettings::new(6, 0, 15)), Config::default());
    assert!(bench.pump.relay().recovery_pending());

    let event = bench.tick();
    assert_eq!(
        event,
        Some(RelayEvent::Activated(ActivationSource::PowerLossRecovery))
    );
    assert_eq!(bench.remaining(), 15 * 60);
}

#[test]
fn boot_recovery_blocked_by_supply_is_dropped() {
    let mut bench = Bench::boot(store_with(OperatingSettings::new(6, 0, 15)), Config::default());
    bench.inputs.sensors.readings = SensorReadings::new(0, 0);

    assert_eq!(
        bench.tick(),
        Some(RelayEvent::Blocked(ActivationSource::PowerLossRecovery))
    );

    bench.inputs.sensors.readings = SensorReadings::new(5, 52);
    assert_eq!(bench.tick(), None);
    assert!(!bench.relay_on());
}

#[test]
fn boot_recovery_can_be_disabled() {
    let config = Config::default()
        .with_schedule(ScheduleConfig::default().with_resume_after_power_loss(false));
    let mut bench = Bench::boot(store_with(OperatingSettings::new(6, 0, 15)), config);

    assert!(!bench.pump.relay().recovery_pending());
    assert_eq!(bench.tick(), None);
}

#[test]
fn boot_from_erased_store_uses_default_duration() {
    let mut bench = Bench::boot(MockEeprom::erased(64), Config::default());

    assert_eq!(*bench.pump.settings(), OperatingSettings::new(0, 0, 20));
    assert_eq!(bench.pump.sensors(), SensorReadings::default());
    assert!(!bench.pump.relay().recovery_pending());

    bench.tick();
    assert_eq!(bench.screen().1, "20 min      5 A");
}

#[test]
fn boot_loads_from_base_address() {
    let mut repo = SettingsRepository::new(MockEeprom::new(), 32);
    repo.save(&OperatingSettings::new(9, 15, 5), SensorReadings::new(4, 51))
        .unwrap();

    let config = Config::default()
        .with_storage(rs_pumptimer::StorageConfig::default().with_base_address(32))
        .with_schedule(ScheduleConfig::default().with_resume_after_power_loss(false));
    let bench = Bench::boot(repo.into_store(), config);

    assert_eq!(*bench.pump.settings(), OperatingSettings::new(9, 15, 5));
    assert_eq!(bench.pump.sensors(), SensorReadings::new(4, 51));
}

#[test]
fn boot_fails_when_store_is_unreadable() {
    let result = PumpController::boot(
        MockRelay::new(),
        MockEeprom::erased(4),
        MockDisplay::new(16, 2),
        Config::default(),
    );
    assert!(matches!(result, Err(ControlError::Storage(()))));
}

// ============================================================================
// Delete-all from the status view
// ============================================================================

#[test]
fn held_in_status_deletes_everything() {
    let mut bench = Bench::boot(store_with(OperatingSettings::new(6, 0, 15)), Config::default());
    bench.inputs.sensors.readings = SensorReadings::new(0, 0); // keep recovery from starting

    bench.press(ButtonEvent::Held);

    assert_eq!(*bench.pump.settings(), OperatingSettings::zeroed());
    let mut store = bench.pump.repository().store().clone();
    assert_eq!(
        PersistedRecord::read_from(&mut store, 0).unwrap(),
        PersistedRecord::ZEROED
    );
    assert_eq!(bench.screen(), ("All settings".into(), "deleted.".into()));
}

#[test]
fn failed_delete_still_reports_trip() {
    let config = Config::default()
        .with_schedule(ScheduleConfig::default().with_resume_after_power_loss(false));
    let mut store = store_with(OperatingSettings::new(6, 0, 15));
    store.fail_writes = true;
    let mut bench = Bench::boot(store, config);

    assert_eq!(
        bench.press(ButtonEvent::Clicked),
        Some(RelayEvent::Activated(ActivationSource::Manual))
    );

    bench.inputs.sensors.readings.current_amps = 20;
    bench.inputs.encoder.queue_button(ButtonEvent::Held);
    let result = bench.try_tick();

    assert!(matches!(result, Err(ControlError::Storage(()))));
    assert!(!bench.relay_on());
    assert!(!bench.energized());
    assert_eq!(
        bench.pump.relay().last_event(),
        Some(RelayEvent::Deactivated(TripReason::Overcurrent))
    );
    assert_eq!(*bench.pump.mode(), Mode::Status);
    assert_eq!(*bench.pump.settings(), OperatingSettings::new(6, 0, 15));
}

#[test]
fn click_after_delete_only_dismisses_notice() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.press(ButtonEvent::Held);

    assert_eq!(bench.press(ButtonEvent::Clicked), None);
    assert_eq!(*bench.pump.mode(), Mode::Status);

    // Duration is now zero, so a further click cannot start the pump.
    assert_eq!(bench.press(ButtonEvent::Clicked), None);
    assert!(!bench.relay_on());
}

#[test]
fn notice_times_out() {
    let mut bench = Bench::with_settings(OperatingSettings::new(8, 0, 20));
    bench.press(ButtonEvent::Held);

    bench.advance_ms(1_999);
    bench.tick();
    assert!(matches!(bench.pump.mode(), Mode::Notice { .. }));

    bench.advance_ms(1);
    bench.tick();
    assert_eq!(*bench.pump.mode(), Mode::Status);
}
