//! Control loop — the hexagonal core.
//!
//! [`ControlLoop`] owns the pump controller, the moisture calibration and
//! the sensor aggregator.  All I/O flows through port traits injected at
//! call sites, making the whole cycle testable with mock adapters.
//!
//! ```text
//!  Sensor ports ──▶ ┌────────────────────────┐ ──▶ TelemetrySink
//!                   │      ControlLoop        │
//!  CommandChannel ─▶│  Pump · Aggregator      │ ──▶ EventSink
//!                   └────────────────────────┘
//!                               │
//!                               ▼
//!                          RelayOutput
//! ```

use crate::config::SystemConfig;
use crate::control::pump::{PumpController, PumpState};
use crate::error::{Error, Result};
use crate::fsm::StateId;
use crate::sensors::aggregator::SensorAggregator;
use crate::sensors::moisture::MoistureReader;

use super::events::{AppEvent, TelemetrySnapshot};
use super::ports::{
    ClimateSensor, Clock, CommandChannel, DistanceSensor, EventSink, LightSensor, MoistureSensor,
    RelayOutput, TelemetrySink,
};

/// Outcome of one successful cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub snapshot: TelemetrySnapshot,
    /// Whether the link accepted the snapshot.
    pub published: bool,
    pub pump: PumpState,
}

pub struct ControlLoop {
    config: SystemConfig,
    pump: PumpController,
    moisture: MoistureReader,
    aggregator: SensorAggregator,
    cycle_count: u64,
}

impl ControlLoop {
    /// Construct the loop.  The configuration is validated first; the pump
    /// starts in `AutoIdle` with the relay off.
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate().map_err(Error::Config)?;
        Ok(Self {
            pump: PumpController::new(&config),
            moisture: MoistureReader::new(config.calibration),
            aggregator: SensorAggregator::new(&config),
            config,
            cycle_count: 0,
        })
    }

    /// Announce the initial state and drive the relay to match it.
    pub fn start(&mut self, relay: &mut impl RelayOutput, sink: &mut impl EventSink) {
        relay.set_relay(self.pump.relay_on());
        sink.emit(&AppEvent::Started(self.pump.state()));
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full cycle: command → moisture → pump → sampling → publish.
    ///
    /// A failed moisture read or sampling acquisition returns early: no
    /// telemetry is published and the relay keeps its last commanded state.
    pub fn run_cycle<H, L, K, E>(
        &mut self,
        hw: &mut H,
        link: &mut L,
        clock: &mut K,
        sink: &mut E,
    ) -> Result<CycleReport>
    where
        H: MoistureSensor + DistanceSensor + ClimateSensor + LightSensor + RelayOutput,
        L: CommandChannel + TelemetrySink,
        K: Clock,
        E: EventSink,
    {
        self.cycle_count += 1;
        let cycle = self.cycle_count;
        self.pump.begin_cycle();
        sink.emit(&AppEvent::CycleStarted { cycle });

        // 1. Manual command first, so it wins over the automatic step.
        Self::service_command(&mut self.pump, link, hw, clock, sink);

        // 2. Moisture → automatic evaluation.
        let raw = hw.read_raw()?;
        let moisture_pct = self.moisture.percent(raw);
        if let Some(t) = self.pump.evaluate(moisture_pct, clock.now_ms()) {
            sink.emit(&AppEvent::PumpTransition(t));
        }
        hw.set_relay(self.pump.relay_on());

        // 3. Sampling burst, draining commands between acquisitions.
        let aggregator = self.aggregator;
        let pump = &mut self.pump;
        let ambient = aggregator.collect(hw, clock, |hw, clock| {
            Self::service_command(pump, link, hw, clock, sink)
        })?;

        // 4. Telemetry.
        let snapshot = TelemetrySnapshot {
            fill_level_mm: ambient.fill_level_mm,
            temperature_c: ambient.temperature_c,
            humidity_pct: ambient.humidity_pct,
            illuminance_lux: ambient.illuminance_lux,
            soil_moisture_pct: moisture_pct,
            timestamp_ms: clock.now_ms(),
        };
        let published = match link.publish(&snapshot) {
            Ok(()) => {
                sink.emit(&AppEvent::TelemetryPublished(snapshot));
                true
            }
            Err(e) => {
                sink.emit(&AppEvent::PublishFailed(e));
                false
            }
        };

        Ok(CycleReport {
            cycle,
            snapshot,
            published,
            pump: self.pump.pump_state(),
        })
    }

    /// Sleep until the next cycle.  Wet soil (at or above the idle
    /// extension threshold) adds the extension first.
    pub fn pause_after<K: Clock, E: EventSink>(
        &self,
        report: Option<&CycleReport>,
        clock: &mut K,
        sink: &mut E,
    ) {
        if let (Some(ext), Some(report)) = (self.config.idle_extension, report) {
            let pct = report.snapshot.soil_moisture_pct;
            if pct >= ext.moisture_threshold_pct {
                sink.emit(&AppEvent::IdleExtended {
                    moisture_pct: pct,
                    sleep_ms: ext.sleep_ms,
                });
                clock.sleep_ms(ext.sleep_ms);
            }
        }
        clock.sleep_ms(self.config.cycle_interval_ms);
    }

    /// Run cycles until a fatal error.  Transient failures are reported
    /// and retried after the normal pause; a fatal one is reported and
    /// returned.
    pub fn run<H, L, K, E>(&mut self, hw: &mut H, link: &mut L, clock: &mut K, sink: &mut E) -> Error
    where
        H: MoistureSensor + DistanceSensor + ClimateSensor + LightSensor + RelayOutput,
        L: CommandChannel + TelemetrySink,
        K: Clock,
        E: EventSink,
    {
        loop {
            match self.run_cycle(hw, link, clock, sink) {
                Ok(report) => self.pause_after(Some(&report), clock, sink),
                Err(e) => {
                    sink.emit(&AppEvent::CycleAborted(e));
                    if e.is_fatal() {
                        return e;
                    }
                    self.pause_after(None, clock, sink);
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.pump.state()
    }

    pub fn pump_state(&self) -> PumpState {
        self.pump.pump_state()
    }

    /// Cycles started since construction.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Consume at most one pending command and push the result to the relay.
    fn service_command<H, L, K, E>(
        pump: &mut PumpController,
        link: &mut L,
        hw: &mut H,
        clock: &mut K,
        sink: &mut E,
    ) where
        H: RelayOutput,
        L: CommandChannel,
        K: Clock,
        E: EventSink,
    {
        match link.poll_pending() {
            Ok(Some(cmd)) => {
                let t = pump.handle_command(cmd, clock.now_ms());
                sink.emit(&AppEvent::CommandApplied(cmd));
                if let Some(t) = t {
                    sink.emit(&AppEvent::PumpTransition(t));
                }
                hw.set_relay(pump.relay_on());
            }
            Ok(None) => {}
            Err(e) => sink.emit(&AppEvent::CommandRejected(e)),
        }
    }
}
