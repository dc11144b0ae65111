//! AHT21 temperature / relative-humidity sensor (I2C 0x38).
//!
//! One trigger yields both quantities.  The 20-bit raw fields are
//! converted by [`decode`], which is pure and host-tested.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::ports::ClimateSample;
use crate::error::SensorError;

pub const AHT21_ADDR: u8 = 0x38;

const CMD_INIT: [u8; 3] = [0xBE, 0x08, 0x00];
const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];

const STATUS_BUSY: u8 = 0x80;
const STATUS_CALIBRATED: u8 = 0x08;

const POWER_UP_MS: u32 = 40;
const INIT_MS: u32 = 10;
const CONVERSION_MS: u32 = 80;

/// 2^20, full scale of both raw fields.
const FULL_SCALE: f32 = 1_048_576.0;

pub struct Aht21 {
    address: u8,
}

impl Default for Aht21 {
    fn default() -> Self {
        Self::new(AHT21_ADDR)
    }
}

impl Aht21 {
    pub fn new(address: u8) -> Self {
        Self { address }
    }

    /// Wait out power-up and send the calibration command.
    pub fn init<I: I2c, D: DelayNs>(&mut self, i2c: &mut I, delay: &mut D) -> Result<(), SensorError> {
        delay.delay_ms(POWER_UP_MS);
        i2c.write(self.address, &CMD_INIT)
            .map_err(|_| SensorError::Bus)?;
        delay.delay_ms(INIT_MS);
        Ok(())
    }

    /// Trigger one conversion and read it back.
    pub fn measure<I: I2c, D: DelayNs>(
        &mut self,
        i2c: &mut I,
        delay: &mut D,
    ) -> Result<ClimateSample, SensorError> {
        i2c.write(self.address, &CMD_TRIGGER)
            .map_err(|_| SensorError::Bus)?;
        delay.delay_ms(CONVERSION_MS);

        let mut frame = [0u8; 6];
        i2c.read(self.address, &mut frame)
            .map_err(|_| SensorError::Bus)?;
        decode(&frame)
    }
}

/// Convert a 6-byte measurement frame.
///
/// Byte 0 is status; humidity is the next 20 bits, temperature the 20 after.
pub fn decode(frame: &[u8; 6]) -> Result<ClimateSample, SensorError> {
    let status = frame[0];
    if status & STATUS_BUSY != 0 || status & STATUS_CALIBRATED == 0 {
        return Err(SensorError::NotReady);
    }

    let raw_hum =
        ((frame[1] as u32) << 12) | ((frame[2] as u32) << 4) | ((frame[3] as u32) >> 4);
    let raw_temp =
        (((frame[3] & 0x0F) as u32) << 16) | ((frame[4] as u32) << 8) | frame[5] as u32;

    Ok(ClimateSample {
        humidity_pct: raw_hum as f32 / FULL_SCALE * 100.0,
        temperature_c: raw_temp as f32 / FULL_SCALE * 200.0 - 50.0,
    })
}
