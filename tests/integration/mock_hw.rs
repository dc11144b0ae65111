//! Mock adapters for integration tests.
//!
//! Records every relay call so tests can assert on the full actuation
//! history without touching real GPIO, and scripts sensor readings,
//! inbound commands and publish results.

use std::collections::VecDeque;

use bloombuddy::app::commands::ManualCommand;
use bloombuddy::app::events::{AppEvent, TelemetrySnapshot};
use bloombuddy::app::ports::{
    ClimateSample, ClimateSensor, Clock, CommandChannel, DistanceSensor, EventSink, LightSensor,
    MoistureSensor, RelayOutput, TelemetrySink,
};
use bloombuddy::error::{CommandError, CommsError, SensorError};

// ── Soil raw counts for the default calibration (3070 dry / 1700 wet) ──

pub const RAW_BONE_DRY: u16 = 3070; // 0 %
pub const RAW_AT_THRESHOLD: u16 = 2522; // 40 %
pub const RAW_JUST_ABOVE: u16 = 2508; // 41 %
pub const RAW_WET: u16 = 1974; // 80 %
pub const RAW_SOAKED: u16 = 1700; // 100 %

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Every `set_relay` call, in order.
    pub relay_calls: Vec<bool>,
    pub soil_raw: u16,
    pub fail_soil: bool,
    pub distance_mm: f32,
    pub climate: ClimateSample,
    pub lux: f32,
    /// Light reads left before the sensor starts failing.
    pub light_reads_before_failure: Option<usize>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(soil_raw: u16) -> Self {
        Self {
            relay_calls: Vec::new(),
            soil_raw,
            fail_soil: false,
            distance_mm: 120.0,
            climate: ClimateSample {
                temperature_c: 21.4,
                humidity_pct: 48.6,
            },
            lux: 310.0,
            light_reads_before_failure: None,
        }
    }

    pub fn relay_on(&self) -> bool {
        self.relay_calls.last().copied().unwrap_or(false)
    }
}

impl MoistureSensor for MockHardware {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        if self.fail_soil {
            return Err(SensorError::Bus);
        }
        Ok(self.soil_raw)
    }
}

impl DistanceSensor for MockHardware {
    fn read_distance_mm(&mut self) -> Result<f32, SensorError> {
        Ok(self.distance_mm)
    }
}

impl ClimateSensor for MockHardware {
    fn measure(&mut self) -> Result<ClimateSample, SensorError> {
        Ok(self.climate)
    }
}

impl LightSensor for MockHardware {
    fn read_lux(&mut self) -> Result<f32, SensorError> {
        match self.light_reads_before_failure.as_mut() {
            Some(0) => Err(SensorError::Timeout),
            Some(left) => {
                *left -= 1;
                Ok(self.lux)
            }
            None => Ok(self.lux),
        }
    }
}

impl RelayOutput for MockHardware {
    fn set_relay(&mut self, on: bool) {
        self.relay_calls.push(on);
    }
}

// ── MockLink ──────────────────────────────────────────────────

/// Command channel + telemetry sink.  `script` is consumed one entry per
/// poll; an exhausted script reads as "nothing pending".
pub struct MockLink {
    pub script: VecDeque<Result<Option<ManualCommand>, CommandError>>,
    pub polls: usize,
    pub published: Vec<TelemetrySnapshot>,
    pub fail_publish: bool,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            polls: 0,
            published: Vec::new(),
            fail_publish: false,
        }
    }

    /// Deliver `cmd` at the next poll.
    pub fn queue(&mut self, cmd: ManualCommand) {
        self.script.push_back(Ok(Some(cmd)));
    }

    /// Deliver `cmd` at poll number `n` (0-based, counted from now).
    pub fn queue_at_poll(&mut self, n: usize, cmd: ManualCommand) {
        while self.script.len() < n {
            self.script.push_back(Ok(None));
        }
        self.script.push_back(Ok(Some(cmd)));
    }

    pub fn queue_garbage(&mut self, e: CommandError) {
        self.script.push_back(Err(e));
    }
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandChannel for MockLink {
    fn poll_pending(&mut self) -> Result<Option<ManualCommand>, CommandError> {
        self.polls += 1;
        self.script.pop_front().unwrap_or(Ok(None))
    }
}

impl TelemetrySink for MockLink {
    fn publish(&mut self, snapshot: &TelemetrySnapshot) -> Result<(), CommsError> {
        if self.fail_publish {
            return Err(CommsError::Disconnected);
        }
        self.published.push(*snapshot);
        Ok(())
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Time only moves when the code under test sleeps or a test sets it.
pub struct ManualClock {
    pub now: u64,
    pub slept: Vec<u32>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: 0,
            slept: Vec::new(),
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.slept.push(ms);
        self.now += ms as u64;
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
