//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::CycleStarted { cycle } => {
                info!("CYCLE | #{} started", cycle);
            }
            AppEvent::CycleAborted(e) => {
                warn!("CYCLE | aborted: {}", e);
            }
            AppEvent::CommandApplied(cmd) => {
                info!("CMD   | manual {:?} applied", cmd);
            }
            AppEvent::CommandRejected(e) => {
                warn!("CMD   | rejected: {}", e);
            }
            AppEvent::PumpTransition(t) => {
                info!("PUMP  | {:?} -> {:?}", t.from, t.to);
            }
            AppEvent::TelemetryPublished(t) => {
                info!(
                    "TELEM | fill={:.0}mm | T={}\u{00b0}C | RH={}% | light={:.0}lx | soil={}%",
                    t.fill_level_mm, t.temperature_c, t.humidity_pct, t.illuminance_lux,
                    t.soil_moisture_pct,
                );
            }
            AppEvent::PublishFailed(e) => {
                warn!("TELEM | publish failed: {}", e);
            }
            AppEvent::IdleExtended {
                moisture_pct,
                sleep_ms,
            } => {
                info!("IDLE  | soil {}% wet, extra sleep {} ms", moisture_pct, sleep_ms);
            }
        }
    }
}
