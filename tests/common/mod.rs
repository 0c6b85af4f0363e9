//! Test bench wiring a `PumpController` to the mock peripherals.

#![allow(dead_code)]

use rs_pumptimer::hal::{
    MockClock, MockDisplay, MockEeprom, MockEmergency, MockEncoder, MockRelay, MockRtc,
    MockSensors,
};
use rs_pumptimer::{
    ButtonEvent, Config, ControlError, OperatingSettings, PumpController, RelayEvent, TickSampler,
};

pub type Pump = PumpController<MockRelay, MockEeprom, MockDisplay>;

pub type Inputs = TickSampler<MockRtc, MockEncoder, MockEmergency, MockSensors, MockClock>;

/// Supply comfortably above the start lockout.
pub const CURRENT_OK: i16 = 5;
pub const VOLTAGE_OK: i16 = 52;

pub struct Bench {
    pub pump: Pump,
    pub inputs: Inputs,
}

impl Bench {
    /// Boots on a zeroed store, then installs `settings` without saving.
    pub fn with_settings(settings: OperatingSettings) -> Self {
        let mut bench = Self::boot(MockEeprom::new(), Config::default());
        bench.pump.set_settings(settings);
        bench
    }

    /// Boots on `store` with `config`; clock at noon, healthy supply.
    pub fn boot(store: MockEeprom, config: Config) -> Self {
        let pump = PumpController::boot(
            MockRelay::new(),
            store,
            MockDisplay::new(16, 2),
            config,
        )
        .unwrap();

        Self {
            pump,
            inputs: TickSampler::new(
                MockRtc::at(12, 0, 0),
                MockEncoder::new(),
                MockEmergency::new(),
                MockSensors::new(CURRENT_OK, VOLTAGE_OK),
                MockClock::new(),
            ),
        }
    }

    /// One firmware loop iteration.
    pub fn tick(&mut self) -> Option<RelayEvent> {
        self.try_tick().unwrap()
    }

    pub fn try_tick(&mut self) -> Result<Option<RelayEvent>, ControlError<(), (), ()>> {
        self.pump.poll(&mut self.inputs)
    }

    pub fn press(&mut self, event: ButtonEvent) -> Option<RelayEvent> {
        self.inputs.encoder.queue_button(event);
        self.tick()
    }

    pub fn turn(&mut self, detents: i32) -> Option<RelayEvent> {
        self.inputs.encoder.turn(detents);
        self.tick()
    }

    /// Advances monotonic time only.
    pub fn advance_ms(&mut self, ms: u64) {
        self.inputs.clock.advance(ms);
    }

    pub fn relay_on(&self) -> bool {
        self.pump.relay().is_on()
    }

    pub fn remaining(&self) -> i32 {
        self.pump.relay().state().remaining_seconds
    }

    pub fn energized(&self) -> bool {
        self.pump.relay().output().energized
    }

    pub fn screen(&self) -> (String, String) {
        (self.pump.display().line(0), self.pump.display().line(1))
    }
}
