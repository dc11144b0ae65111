//! Unified error types for the BloomBuddy firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's failure handling uniform.  All variants are `Copy` so they
//! can be passed through the aggregator and the event sink without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible core operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A single acquisition failed.  Transient: the cycle is abandoned and
    /// retried on the next one.
    Sensor(SensorError),
    /// A trimmed mean was requested from a buffer with no samples.
    /// Unreachable with a validated configuration.
    EmptySampleSet,
    /// A sample was pushed into a buffer that was full or belonged to a
    /// different signal.
    SampleRejected,
    /// Configuration failed validation.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::EmptySampleSet => write!(f, "trimmed mean of an empty sample set"),
            Self::SampleRejected => write!(f, "sample rejected by buffer"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

impl Error {
    /// Logic defects and bad configuration.  Retrying cannot help; the
    /// control loop stops on these.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EmptySampleSet | Self::SampleRejected | Self::Config(_))
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// I2C transfer or ADC conversion failed.
    Bus,
    /// The device did not finish a conversion in time.
    Timeout,
    /// The device reported itself busy or uncalibrated.
    NotReady,
    /// The device returned a non-finite value.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "bus transfer failed"),
            Self::Timeout => write!(f, "conversion timed out"),
            Self::NotReady => write!(f, "device not ready"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Payload was not a JSON object with a switch field.
    Malformed,
    /// Switch field held something other than `ON` / `OFF`.
    UnknownState,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed payload"),
            Self::UnknownState => write!(f, "unknown switch state"),
        }
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// The payload could not be encoded.
    Encode,
    /// The broker client refused or failed the publish.
    PublishFailed,
    /// No broker session is up.
    Disconnected,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => write!(f, "payload encoding failed"),
            Self::PublishFailed => write!(f, "MQTT publish failed"),
            Self::Disconnected => write!(f, "MQTT disconnected"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
