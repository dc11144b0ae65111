//! Peripheral drivers: I2C sensors, the soil ADC and the pump relay.
//!
//! The I2C drivers hold only their address; the bus and delay are passed
//! per call so all three devices can share one bus without a mutex.

pub mod aht21;
pub mod bh1750;
pub mod relay;
#[cfg(target_os = "espidf")]
pub mod soil_adc;
pub mod vl53l0x;
