//! BH1750 ambient light sensor (I2C 0x23).
//!
//! One-time high-resolution mode: the device powers down after each
//! conversion, so every read is a fresh measurement.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::SensorError;

pub const BH1750_ADDR: u8 = 0x23;

const CMD_POWER_ON: u8 = 0x01;
const CMD_RESET: u8 = 0x07;
const CMD_ONE_TIME_HIGH_RES: u8 = 0x20;

/// Worst-case high-resolution conversion time.
const CONVERSION_MS: u32 = 180;

pub struct Bh1750 {
    address: u8,
}

impl Default for Bh1750 {
    fn default() -> Self {
        Self::new(BH1750_ADDR)
    }
}

impl Bh1750 {
    pub fn new(address: u8) -> Self {
        Self { address }
    }

    /// Power on and clear the data register.
    pub fn init<I: I2c>(&mut self, i2c: &mut I) -> Result<(), SensorError> {
        i2c.write(self.address, &[CMD_POWER_ON])
            .map_err(|_| SensorError::Bus)?;
        i2c.write(self.address, &[CMD_RESET])
            .map_err(|_| SensorError::Bus)
    }

    pub fn read_lux<I: I2c, D: DelayNs>(&mut self, i2c: &mut I, delay: &mut D) -> Result<f32, SensorError> {
        i2c.write(self.address, &[CMD_ONE_TIME_HIGH_RES])
            .map_err(|_| SensorError::Bus)?;
        delay.delay_ms(CONVERSION_MS);

        let mut buf = [0u8; 2];
        i2c.read(self.address, &mut buf)
            .map_err(|_| SensorError::Bus)?;
        Ok(counts_to_lux(u16::from_be_bytes(buf)))
    }
}

/// Default measurement time register: counts / 1.2 = lux.
pub fn counts_to_lux(counts: u16) -> f32 {
    counts as f32 / 1.2
}
