//! Capacitive soil probe on the ESP32-S3 oneshot ADC.
//!
//! 11 dB attenuation (full 0–3.1 V range), 12-bit raw counts.  The pin sits
//! on ADC2, which the Wi-Fi driver also arbitrates; a conversion refused
//! while the radio holds the unit is reported as a bus error and retried
//! next cycle.

use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::adc::ADC2;
use esp_idf_hal::gpio::Gpio15;
use esp_idf_hal::sys::EspError;
use log::warn;

use crate::app::ports::MoistureSensor;
use crate::error::SensorError;

pub struct SoilAdc {
    channel: AdcChannelDriver<'static, Gpio15, AdcDriver<'static, ADC2>>,
}

impl SoilAdc {
    pub fn new(adc: ADC2, pin: Gpio15) -> Result<Self, EspError> {
        let driver = AdcDriver::new(adc)?;
        let config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };
        let channel = AdcChannelDriver::new(driver, pin, &config)?;
        Ok(Self { channel })
    }
}

impl MoistureSensor for SoilAdc {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        self.channel.read_raw().map_err(|e| {
            warn!("soil ADC read failed: {}", e);
            SensorError::Bus
        })
    }
}
