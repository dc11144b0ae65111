//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port at fixed lifecycle points.
//! What happens to them is up to the adapter on the other side; the
//! firmware logs them to serial.

use crate::error::{CommandError, CommsError, Error};
use crate::fsm::{StateId, Transition};

use super::commands::ManualCommand;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The control loop has been constructed (carries the initial state).
    Started(StateId),

    /// A new control cycle begins.
    CycleStarted { cycle: u64 },

    /// A manual command was accepted and applied.
    CommandApplied(ManualCommand),

    /// A manual command payload was rejected; pump state untouched.
    CommandRejected(CommandError),

    /// The pump state machine moved.
    PumpTransition(Transition),

    /// The cycle ended early (sensor failure).  Relay left as commanded.
    CycleAborted(Error),

    /// A telemetry snapshot left the device.
    TelemetryPublished(TelemetrySnapshot),

    /// Telemetry could not be handed to the link.  Not retried.
    PublishFailed(CommsError),

    /// Wet soil: the next cycle is pushed back.
    IdleExtended { moisture_pct: u8, sleep_ms: u32 },
}

/// One cycle's smoothed readings.  Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    /// Distance from the sensor to the water surface (mm).
    pub fill_level_mm: f32,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub illuminance_lux: f32,
    pub soil_moisture_pct: u8,
    /// Monotonic ms at which the snapshot was assembled.
    pub timestamp_ms: u64,
}
