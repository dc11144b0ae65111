//! Sensor subsystem — calibration, outlier rejection and the per-cycle
//! [`SensorAggregator`](aggregator::SensorAggregator).
//!
//! Device drivers live in [`crate::drivers`]; this module only deals in
//! numbers that have already left the bus.

pub mod aggregator;
pub mod moisture;
pub mod sample_buffer;

/// The quantities the appliance measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Tank fill level as a time-of-flight distance (mm).
    FillLevel,
    /// Air temperature (°C).
    Temperature,
    /// Relative humidity (%).
    Humidity,
    /// Illuminance (lux).
    Illuminance,
}

/// A single scalar reading tagged with the signal it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub signal: Signal,
    pub value: f32,
}

impl RawSample {
    pub fn new(signal: Signal, value: f32) -> Self {
        Self { signal, value }
    }
}
