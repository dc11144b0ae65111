//! Per-cycle sampling of the periodic sensors.
//!
//! Each signal is sampled `samples_per_signal` times in a burst (tank
//! distance first, then temperature/humidity, then light) with a fixed
//! pause after every acquisition.  Before each acquisition a caller hook
//! runs so the control loop can drain the manual-command channel; a full
//! burst takes around three seconds and an operator pressing the pump
//! button must not wait for it.

use log::debug;

use super::sample_buffer::SampleBuffer;
use super::{RawSample, Signal};
use crate::app::ports::{ClimateSensor, Clock, DistanceSensor, LightSensor};
use crate::config::SystemConfig;
use crate::error::{Result, SensorError};

/// Smoothed values for the periodic signals of one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientReadings {
    pub fill_level_mm: f32,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub illuminance_lux: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct SensorAggregator {
    samples_per_signal: u8,
    inter_sample_delay_ms: u32,
    climate_decimals: u8,
}

impl SensorAggregator {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            samples_per_signal: config.samples_per_signal,
            inter_sample_delay_ms: config.inter_sample_delay_ms,
            climate_decimals: config.climate_decimals,
        }
    }

    /// Run one sampling burst and reduce every buffer to its trimmed mean.
    ///
    /// `between` is called before every acquisition with the same sensor
    /// and clock handles.  The first failed acquisition aborts the burst.
    pub fn collect<S, K>(
        &self,
        sensors: &mut S,
        clock: &mut K,
        mut between: impl FnMut(&mut S, &mut K),
    ) -> Result<AmbientReadings>
    where
        S: DistanceSensor + ClimateSensor + LightSensor,
        K: Clock,
    {
        let mut fill = SampleBuffer::new(Signal::FillLevel);
        let mut temperature = SampleBuffer::new(Signal::Temperature);
        let mut humidity = SampleBuffer::new(Signal::Humidity);
        let mut light = SampleBuffer::new(Signal::Illuminance);

        for _ in 0..self.samples_per_signal {
            between(sensors, clock);
            let mm = finite(sensors.read_distance_mm()?)?;
            fill.add(RawSample::new(Signal::FillLevel, mm))?;
            clock.sleep_ms(self.inter_sample_delay_ms);
        }

        for _ in 0..self.samples_per_signal {
            between(sensors, clock);
            let sample = sensors.measure()?;
            temperature.add(RawSample::new(Signal::Temperature, finite(sample.temperature_c)?))?;
            humidity.add(RawSample::new(Signal::Humidity, finite(sample.humidity_pct)?))?;
            clock.sleep_ms(self.inter_sample_delay_ms);
        }

        for _ in 0..self.samples_per_signal {
            between(sensors, clock);
            let lux = finite(sensors.read_lux()?)?;
            light.add(RawSample::new(Signal::Illuminance, lux))?;
            clock.sleep_ms(self.inter_sample_delay_ms);
        }

        let readings = AmbientReadings {
            fill_level_mm: fill.trimmed_mean(0)?,
            temperature_c: temperature.trimmed_mean(self.climate_decimals)?,
            humidity_pct: humidity.trimmed_mean(self.climate_decimals)?,
            illuminance_lux: light.trimmed_mean(0)?,
        };
        debug!("aggregator: {:?}", readings);
        Ok(readings)
    }
}

/// A NaN or infinite reading is a failed acquisition, not a sample.
fn finite(value: f32) -> core::result::Result<f32, SensorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SensorError::OutOfRange)
    }
}
