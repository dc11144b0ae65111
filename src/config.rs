//! System configuration parameters
//!
//! All tunable parameters for the BloomBuddy controller.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

use crate::sensors::moisture::Calibration;
use crate::sensors::sample_buffer::MAX_SAMPLES;

/// Extra pause taken after a cycle that found the soil already wet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleExtension {
    /// Soil moisture (%) at or above which the extra pause applies
    pub moisture_threshold_pct: u8,
    /// Additional sleep (milliseconds), taken after telemetry is published
    pub sleep_ms: u32,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Soil moisture ---
    /// Raw ADC / percentage anchors for dry and wet soil
    pub calibration: Calibration,
    /// Moisture (%) at or below which the automatic cycle starts the pump
    pub low_moisture_threshold_pct: u8,

    // --- Pump ---
    /// Automatic pump run time (milliseconds)
    pub pump_run_duration_ms: u32,
    /// Manual OFF parks the pump in manual mode instead of handing back to
    /// the automatic cycle
    pub manual_off_holds: bool,

    // --- Sampling ---
    /// Acquisitions per periodic signal per cycle
    pub samples_per_signal: u8,
    /// Pause after every acquisition (milliseconds)
    pub inter_sample_delay_ms: u32,
    /// Decimal places kept for temperature and humidity (0 = whole numbers)
    pub climate_decimals: u8,

    // --- Timing ---
    /// Pause between control cycles (milliseconds)
    pub cycle_interval_ms: u32,
    /// Optional extra pause when the soil is wet
    pub idle_extension: Option<IdleExtension>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Soil moisture
            calibration: Calibration::default(),
            low_moisture_threshold_pct: 40,

            // Pump
            pump_run_duration_ms: 15_000,
            manual_off_holds: false,

            // Sampling
            samples_per_signal: 10,
            inter_sample_delay_ms: 100,
            climate_decimals: 0,

            // Timing
            cycle_interval_ms: 15_000,
            idle_extension: Some(IdleExtension {
                moisture_threshold_pct: 80,
                sleep_ms: 30_000,
            }),
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid configs must never reach the
    /// control loop or be persisted.
    pub fn validate(&self) -> Result<(), &'static str> {
        self.calibration.validate()?;
        if self.low_moisture_threshold_pct > 100 {
            return Err("low_moisture_threshold_pct must be 0–100");
        }
        if self.pump_run_duration_ms == 0 {
            return Err("pump_run_duration_ms must be > 0");
        }
        if self.samples_per_signal == 0 {
            return Err("samples_per_signal must be > 0");
        }
        if self.samples_per_signal as usize > MAX_SAMPLES {
            return Err("samples_per_signal exceeds sample buffer capacity");
        }
        if self.climate_decimals > 3 {
            return Err("climate_decimals must be 0–3");
        }
        if self.cycle_interval_ms == 0 {
            return Err("cycle_interval_ms must be > 0");
        }
        if let Some(ext) = &self.idle_extension {
            if ext.moisture_threshold_pct > 100 {
                return Err("idle_extension.moisture_threshold_pct must be 0–100");
            }
            if ext.moisture_threshold_pct <= self.low_moisture_threshold_pct {
                return Err("idle_extension threshold must be above the watering threshold");
            }
        }
        Ok(())
    }
}

/// Broker settings for the telemetry / manual-command link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttConfig {
    pub broker_url: heapless::String<64>,
    pub client_id: heapless::String<32>,
    /// Telemetry is published here and manual commands arrive here.
    pub topic: heapless::String<64>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        let mut broker_url = heapless::String::new();
        let _ = broker_url.push_str("mqtt://192.168.33.79:1883");
        let mut client_id = heapless::String::new();
        let _ = client_id.push_str("ESP32_Client");
        let mut topic = heapless::String::new();
        let _ = topic.push_str("Zuhause/Wohnung/BloomBuddy");
        Self {
            broker_url,
            client_id,
            topic,
        }
    }
}
