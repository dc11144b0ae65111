//! Integration tests for the ControlLoop → PumpController → relay pipeline.
//!
//! Every test drives whole cycles through mock adapters and checks what
//! an observer of the device would see: relay writes, published telemetry
//! and the event stream.

use crate::mock_hw::{
    MockHardware, MockLink, ManualClock, RecordingSink, RAW_AT_THRESHOLD, RAW_BONE_DRY,
    RAW_JUST_ABOVE, RAW_SOAKED, RAW_WET,
};

use bloombuddy::app::commands::ManualCommand;
use bloombuddy::app::events::AppEvent;
use bloombuddy::app::service::ControlLoop;
use bloombuddy::config::SystemConfig;
use bloombuddy::error::{CommandError, CommsError, Error, SensorError};
use bloombuddy::fsm::{Mode, StateId};

/// One sample per signal and no inter-sample pause, so the clock only
/// moves when a test moves it.  Four command polls per cycle.
fn fast_config() -> SystemConfig {
    SystemConfig {
        samples_per_signal: 1,
        inter_sample_delay_ms: 0,
        ..SystemConfig::default()
    }
}

struct Rig {
    ctl: ControlLoop,
    hw: MockHardware,
    link: MockLink,
    clock: ManualClock,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: SystemConfig, soil_raw: u16) -> Self {
        let mut rig = Self {
            ctl: ControlLoop::new(config).unwrap(),
            hw: MockHardware::new(soil_raw),
            link: MockLink::new(),
            clock: ManualClock::new(),
            sink: RecordingSink::new(),
        };
        rig.ctl.start(&mut rig.hw, &mut rig.sink);
        rig
    }

    fn cycle(&mut self) -> bloombuddy::error::Result<bloombuddy::app::service::CycleReport> {
        self.ctl
            .run_cycle(&mut self.hw, &mut self.link, &mut self.clock, &mut self.sink)
    }
}

// ── Automatic watering ───────────────────────────────────────

#[test]
fn start_drives_relay_off() {
    let rig = Rig::new(fast_config(), RAW_SOAKED);
    assert_eq!(rig.hw.relay_calls, vec![false]);
    assert!(matches!(rig.sink.events[0], AppEvent::Started(StateId::AutoIdle)));
}

#[test]
fn dry_soil_switches_pump_on() {
    let mut rig = Rig::new(fast_config(), RAW_BONE_DRY);
    let report = rig.cycle().unwrap();

    assert_eq!(report.snapshot.soil_moisture_pct, 0);
    assert_eq!(rig.ctl.state(), StateId::AutoRunning);
    assert!(rig.hw.relay_on());
    assert_eq!(report.pump.activation_ms, Some(0));
}

#[test]
fn wet_soil_keeps_pump_off() {
    let mut rig = Rig::new(fast_config(), RAW_SOAKED);
    let report = rig.cycle().unwrap();

    assert_eq!(report.snapshot.soil_moisture_pct, 100);
    assert_eq!(rig.ctl.state(), StateId::AutoIdle);
    assert!(!rig.hw.relay_on());
    assert!(rig.hw.relay_calls.iter().all(|on| !on));
}

#[test]
fn threshold_is_inclusive() {
    let mut at = Rig::new(fast_config(), RAW_AT_THRESHOLD);
    assert_eq!(at.cycle().unwrap().snapshot.soil_moisture_pct, 40);
    assert!(at.hw.relay_on(), "40% must start the pump");

    let mut above = Rig::new(fast_config(), RAW_JUST_ABOVE);
    assert_eq!(above.cycle().unwrap().snapshot.soil_moisture_pct, 41);
    assert!(!above.hw.relay_on(), "41% must not start the pump");
}

#[test]
fn pump_stops_exactly_at_run_duration() {
    let mut rig = Rig::new(fast_config(), RAW_BONE_DRY);
    rig.cycle().unwrap();
    assert!(rig.hw.relay_on());

    rig.clock.now = 14_999;
    rig.cycle().unwrap();
    assert_eq!(rig.ctl.state(), StateId::AutoRunning);
    assert!(rig.hw.relay_on(), "one ms short of the run duration");

    rig.clock.now = 15_000;
    rig.cycle().unwrap();
    assert_eq!(rig.ctl.state(), StateId::AutoIdle);
    assert!(!rig.hw.relay_on());
}

#[test]
fn still_dry_after_run_restarts_on_next_cycle() {
    let mut rig = Rig::new(fast_config(), RAW_BONE_DRY);
    rig.cycle().unwrap();
    rig.clock.now = 15_000;
    rig.cycle().unwrap();
    assert!(!rig.hw.relay_on());

    rig.clock.now = 30_000;
    let report = rig.cycle().unwrap();
    assert!(rig.hw.relay_on());
    assert_eq!(report.pump.activation_ms, Some(30_000));
}

#[test]
fn soil_wetting_mid_run_does_not_cut_the_run_short() {
    let mut rig = Rig::new(fast_config(), RAW_BONE_DRY);
    rig.cycle().unwrap();

    rig.hw.soil_raw = RAW_SOAKED;
    rig.clock.now = 5_000;
    rig.cycle().unwrap();
    assert_eq!(rig.ctl.state(), StateId::AutoRunning);
    assert!(rig.hw.relay_on());
}

// ── Manual override ──────────────────────────────────────────

#[test]
fn manual_on_overrides_wet_soil() {
    let mut rig = Rig::new(fast_config(), RAW_SOAKED);
    rig.link.queue(ManualCommand::On);

    let report = rig.cycle().unwrap();
    assert_eq!(rig.ctl.state(), StateId::ManualOn);
    assert_eq!(report.pump.mode, Mode::Manual);
    assert!(rig.hw.relay_on());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::CommandApplied(ManualCommand::On))), 1);
}

#[test]
fn manual_on_persists_past_run_duration() {
    let mut rig = Rig::new(fast_config(), RAW_SOAKED);
    rig.link.queue(ManualCommand::On);
    rig.cycle().unwrap();

    for now in [15_000, 60_000, 600_000] {
        rig.clock.now = now;
        rig.cycle().unwrap();
        assert_eq!(rig.ctl.state(), StateId::ManualOn);
        assert!(rig.hw.relay_on());
    }
}

#[test]
fn manual_off_stops_a_running_pump() {
    let mut rig = Rig::new(fast_config(), RAW_BONE_DRY);
    rig.cycle().unwrap();
    assert!(rig.hw.relay_on());

    rig.clock.now = 1_000;
    rig.link.queue(ManualCommand::Off);
    let report = rig.cycle().unwrap();

    // Manual wins for the whole cycle even though the soil is still dry.
    assert_eq!(rig.ctl.state(), StateId::AutoIdle);
    assert!(!rig.hw.relay_on());
    assert_eq!(report.pump.activation_ms, None);

    // Next cycle is automatic again and re-evaluates the dry soil.
    rig.clock.now = 2_000;
    rig.cycle().unwrap();
    assert_eq!(rig.ctl.state(), StateId::AutoRunning);
    assert!(rig.hw.relay_on());
}

#[test]
fn manual_off_can_hold_when_configured() {
    let cfg = SystemConfig {
        manual_off_holds: true,
        ..fast_config()
    };
    let mut rig = Rig::new(cfg, RAW_BONE_DRY);
    rig.link.queue(ManualCommand::Off);
    rig.cycle().unwrap();
    assert_eq!(rig.ctl.state(), StateId::ManualOff);

    rig.cycle().unwrap();
    assert_eq!(rig.ctl.state(), StateId::ManualOff);
    assert!(!rig.hw.relay_on(), "held OFF ignores dry soil");

    rig.link.queue(ManualCommand::On);
    rig.cycle().unwrap();
    assert_eq!(rig.ctl.state(), StateId::ManualOn);
}

#[test]
fn command_during_sampling_is_applied_mid_cycle() {
    let mut rig = Rig::new(fast_config(), RAW_SOAKED);
    // Poll 0 is the cycle-start check; poll 2 lands between the distance
    // and climate acquisitions.
    rig.link.queue_at_poll(2, ManualCommand::On);

    let report = rig.cycle().unwrap();
    assert_eq!(rig.link.polls, 4);
    assert!(rig.hw.relay_on());
    assert_eq!(report.pump.mode, Mode::Manual);

    // The relay went on during the burst, after the automatic OFF write.
    let last_off = rig.hw.relay_calls.iter().rposition(|on| !on).unwrap();
    let first_on = rig.hw.relay_calls.iter().position(|on| *on).unwrap();
    assert!(first_on > last_off);
}

#[test]
fn malformed_command_is_dropped() {
    let mut rig = Rig::new(fast_config(), RAW_SOAKED);
    rig.link.queue_garbage(CommandError::Malformed);

    let report = rig.cycle().unwrap();
    assert!(report.published);
    assert_eq!(rig.ctl.state(), StateId::AutoIdle);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::CommandRejected(CommandError::Malformed))),
        1
    );
}

// ── Failures ─────────────────────────────────────────────────

#[test]
fn soil_read_failure_aborts_without_touching_relay() {
    let mut rig = Rig::new(fast_config(), RAW_BONE_DRY);
    rig.hw.fail_soil = true;
    let writes_before = rig.hw.relay_calls.len();

    let err = rig.cycle().unwrap_err();
    assert_eq!(err, Error::Sensor(SensorError::Bus));
    assert_eq!(rig.hw.relay_calls.len(), writes_before);
    assert!(rig.link.published.is_empty());
    assert_eq!(rig.ctl.state(), StateId::AutoIdle);
}

#[test]
fn sampling_failure_aborts_without_publishing() {
    let mut rig = Rig::new(fast_config(), RAW_BONE_DRY);
    rig.hw.light_reads_before_failure = Some(0);

    let err = rig.cycle().unwrap_err();
    assert_eq!(err, Error::Sensor(SensorError::Timeout));
    assert!(rig.link.published.is_empty());
    // The pump decision for this cycle was already made and stands.
    assert!(rig.hw.relay_on());
}

#[test]
fn non_finite_reading_is_a_transient_failure() {
    let mut rig = Rig::new(fast_config(), RAW_SOAKED);
    rig.hw.distance_mm = f32::NAN;

    let err = rig.cycle().unwrap_err();
    assert_eq!(err, Error::Sensor(SensorError::OutOfRange));
    assert!(!err.is_fatal());
    assert!(rig.link.published.is_empty());

    rig.hw.distance_mm = 120.0;
    assert!(rig.cycle().unwrap().published);
}

#[test]
fn publish_failure_is_reported_and_cycle_completes() {
    let mut rig = Rig::new(fast_config(), RAW_SOAKED);
    rig.link.fail_publish = true;

    let report = rig.cycle().unwrap();
    assert!(!report.published);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::PublishFailed(CommsError::Disconnected))),
        1
    );
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::TelemetryPublished(_))), 0);
}

// ── Telemetry and pacing ─────────────────────────────────────

#[test]
fn published_snapshot_carries_smoothed_readings() {
    let mut rig = Rig::new(fast_config(), RAW_WET);
    rig.clock.now = 4_242;
    let report = rig.cycle().unwrap();

    assert_eq!(rig.link.published.len(), 1);
    let snap = rig.link.published[0];
    assert_eq!(snap, report.snapshot);
    assert_eq!(snap.soil_moisture_pct, 80);
    assert_eq!(snap.fill_level_mm, 120.0);
    // Climate is rounded to whole units by default.
    assert_eq!(snap.temperature_c, 21.0);
    assert_eq!(snap.humidity_pct, 49.0);
    assert_eq!(snap.illuminance_lux, 310.0);
    assert_eq!(snap.timestamp_ms, 4_242);
}

#[test]
fn full_burst_takes_thirty_pauses() {
    let mut rig = Rig::new(SystemConfig::default(), RAW_SOAKED);
    rig.cycle().unwrap();

    assert_eq!(rig.clock.slept.len(), 30);
    assert!(rig.clock.slept.iter().all(|&ms| ms == 100));
    assert_eq!(rig.link.polls, 1 + 30);
}

#[test]
fn wet_soil_extends_the_pause() {
    let mut rig = Rig::new(fast_config(), RAW_WET);
    let report = rig.cycle().unwrap();
    rig.clock.slept.clear();

    rig.ctl.pause_after(Some(&report), &mut rig.clock, &mut rig.sink);
    assert_eq!(rig.clock.slept, vec![30_000, 15_000]);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::IdleExtended { moisture_pct: 80, sleep_ms: 30_000 })),
        1
    );
}

#[test]
fn events_follow_cycle_order() {
    let mut rig = Rig::new(fast_config(), RAW_BONE_DRY);
    rig.sink.events.clear();
    rig.cycle().unwrap();

    let ev = &rig.sink.events;
    assert!(matches!(ev[0], AppEvent::CycleStarted { cycle: 1 }));
    let transition = ev
        .iter()
        .position(|e| matches!(e, AppEvent::PumpTransition(t) if t.to == StateId::AutoRunning))
        .unwrap();
    let published = ev
        .iter()
        .position(|e| matches!(e, AppEvent::TelemetryPublished(_)))
        .unwrap();
    assert!(transition < published);
    assert_eq!(published, ev.len() - 1);
    assert_eq!(rig.ctl.cycle_count(), 1);
}
