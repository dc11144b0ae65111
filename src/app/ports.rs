//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensors, relay, MQTT link, clock, event sinks, storage)
//! implement these traits.  The [`ControlLoop`](super::service::ControlLoop)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! Every sensor port is fallible: a failed acquisition is reported, never
//! replaced by a made-up value, because the trimmed mean and the pump
//! threshold both need real numbers.

use crate::config::SystemConfig;
use crate::error::{CommandError, CommsError, SensorError};

use super::commands::ManualCommand;
use super::events::{AppEvent, TelemetrySnapshot};

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapters: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Capacitive soil probe on an ADC channel.
pub trait MoistureSensor {
    /// One blocking conversion, raw 12-bit count.
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

/// Time-of-flight ranger looking down into the water tank.
pub trait DistanceSensor {
    /// One blocking ranging measurement in millimetres.
    fn read_distance_mm(&mut self) -> Result<f32, SensorError>;
}

/// One temperature + humidity conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Combined temperature / relative-humidity sensor.
pub trait ClimateSensor {
    /// Trigger a conversion and return both quantities from it.
    fn measure(&mut self) -> Result<ClimateSample, SensorError>;
}

/// Ambient light sensor.
pub trait LightSensor {
    /// One blocking one-shot measurement in lux.
    fn read_lux(&mut self) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Pump relay.  Writes are synchronous and assumed to succeed.
pub trait RelayOutput {
    fn set_relay(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Link ports (driven adapters: domain ↔ MQTT)
// ───────────────────────────────────────────────────────────────

/// Inbound manual override channel.
pub trait CommandChannel {
    /// Non-blocking.  Consumes at most one pending command.
    ///
    /// `Err` means a message arrived but could not be understood; the
    /// caller keeps its current pump state.
    fn poll_pending(&mut self) -> Result<Option<ManualCommand>, CommandError>;
}

/// Outbound telemetry.  Fire-and-forget: no acknowledgement is awaited
/// and implementations must not block indefinitely.
pub trait TelemetrySink {
    fn publish(&mut self, snapshot: &TelemetrySnapshot) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic time and blocking sleeps.
pub trait Clock {
    /// Milliseconds since boot.  Never goes backwards.
    fn now_ms(&self) -> u64;

    /// Block the calling task.
    fn sleep_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s at defined lifecycle points
/// (cycle start, pump transition, publish result).  Adapters decide where
/// they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
