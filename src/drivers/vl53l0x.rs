//! VL53L0X time-of-flight ranger (I2C 0x29), single-shot mode.
//!
//! Mounted above the water tank; the distance to the surface is the fill
//! level signal.  Only the register sequence needed for default-mode
//! single-shot ranging is implemented.  Readings of 8190/8191 mm mean "no
//! target" and are passed through so the trimmed mean can drop them.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::SensorError;

pub const VL53L0X_ADDR: u8 = 0x29;

const SYSRANGE_START: u8 = 0x00;
const SYSTEM_INTERRUPT_CLEAR: u8 = 0x0B;
const RESULT_INTERRUPT_STATUS: u8 = 0x13;
const RESULT_RANGE_STATUS: u8 = 0x14;
const IDENTIFICATION_MODEL_ID: u8 = 0xC0;
const VHV_CONFIG_PAD_SCL_SDA_EXTSUP_HV: u8 = 0x89;

const MODEL_ID: u8 = 0xEE;

/// Polls before a ranging is declared lost.
const POLL_LIMIT: u32 = 500;
const POLL_INTERVAL_MS: u32 = 1;

pub struct Vl53l0x {
    address: u8,
    /// Read once at init, written back before every ranging.
    stop_variable: u8,
}

impl Default for Vl53l0x {
    fn default() -> Self {
        Self::new(VL53L0X_ADDR)
    }
}

impl Vl53l0x {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            stop_variable: 0,
        }
    }

    /// Verify the model id, switch the I/O to 2V8 and latch the stop
    /// variable.
    pub fn init<I: I2c>(&mut self, i2c: &mut I) -> Result<(), SensorError> {
        if self.read_reg(i2c, IDENTIFICATION_MODEL_ID)? != MODEL_ID {
            return Err(SensorError::NotReady);
        }

        let vhv = self.read_reg(i2c, VHV_CONFIG_PAD_SCL_SDA_EXTSUP_HV)?;
        self.write_reg(i2c, VHV_CONFIG_PAD_SCL_SDA_EXTSUP_HV, vhv | 0x01)?;

        self.write_reg(i2c, 0x88, 0x00)?;
        self.write_reg(i2c, 0x80, 0x01)?;
        self.write_reg(i2c, 0xFF, 0x01)?;
        self.write_reg(i2c, 0x00, 0x00)?;
        self.stop_variable = self.read_reg(i2c, 0x91)?;
        self.write_reg(i2c, 0x00, 0x01)?;
        self.write_reg(i2c, 0xFF, 0x00)?;
        self.write_reg(i2c, 0x80, 0x00)
    }

    /// One blocking ranging in millimetres.
    pub fn read_range_mm<I: I2c, D: DelayNs>(
        &mut self,
        i2c: &mut I,
        delay: &mut D,
    ) -> Result<u16, SensorError> {
        self.write_reg(i2c, 0x80, 0x01)?;
        self.write_reg(i2c, 0xFF, 0x01)?;
        self.write_reg(i2c, 0x00, 0x00)?;
        self.write_reg(i2c, 0x91, self.stop_variable)?;
        self.write_reg(i2c, 0x00, 0x01)?;
        self.write_reg(i2c, 0xFF, 0x00)?;
        self.write_reg(i2c, 0x80, 0x00)?;

        self.write_reg(i2c, SYSRANGE_START, 0x01)?;
        self.poll(i2c, delay, SYSRANGE_START, |v| v & 0x01 == 0)?;
        self.poll(i2c, delay, RESULT_INTERRUPT_STATUS, |v| v & 0x07 != 0)?;

        // Range lives 10 bytes into the result block.
        let mut buf = [0u8; 2];
        i2c.write_read(self.address, &[RESULT_RANGE_STATUS + 10], &mut buf)
            .map_err(|_| SensorError::Bus)?;
        self.write_reg(i2c, SYSTEM_INTERRUPT_CLEAR, 0x01)?;

        Ok(u16::from_be_bytes(buf))
    }

    fn poll<I: I2c, D: DelayNs>(
        &mut self,
        i2c: &mut I,
        delay: &mut D,
        reg: u8,
        done: impl Fn(u8) -> bool,
    ) -> Result<(), SensorError> {
        for _ in 0..POLL_LIMIT {
            if done(self.read_reg(i2c, reg)?) {
                return Ok(());
            }
            delay.delay_ms(POLL_INTERVAL_MS);
        }
        Err(SensorError::Timeout)
    }

    fn write_reg<I: I2c>(&mut self, i2c: &mut I, reg: u8, value: u8) -> Result<(), SensorError> {
        i2c.write(self.address, &[reg, value])
            .map_err(|_| SensorError::Bus)
    }

    fn read_reg<I: I2c>(&mut self, i2c: &mut I, reg: u8) -> Result<u8, SensorError> {
        let mut buf = [0u8; 1];
        i2c.write_read(self.address, &[reg], &mut buf)
            .map_err(|_| SensorError::Bus)?;
        Ok(buf[0])
    }
}
