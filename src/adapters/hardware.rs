//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the shared I2C bus, the three I2C sensor drivers, the soil probe
//! and the pump relay, exposing them through the sensor ports and
//! [`RelayOutput`].  Everything is generic over `embedded-hal` traits, so
//! the same adapter runs against scripted buses in host tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::{
    ClimateSample, ClimateSensor, DistanceSensor, LightSensor, MoistureSensor, RelayOutput,
};
use crate::drivers::aht21::Aht21;
use crate::drivers::bh1750::Bh1750;
use crate::drivers::relay::RelayDriver;
use crate::drivers::vl53l0x::Vl53l0x;
use crate::error::SensorError;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I, D, P, M>
where
    I: I2c,
    D: DelayNs,
    P: OutputPin,
    M: MoistureSensor,
{
    i2c: I,
    delay: D,
    climate: Aht21,
    light: Bh1750,
    tof: Vl53l0x,
    soil: M,
    relay: RelayDriver<P>,
}

impl<I, D, P, M> HardwareAdapter<I, D, P, M>
where
    I: I2c,
    D: DelayNs,
    P: OutputPin,
    M: MoistureSensor,
{
    pub fn new(i2c: I, delay: D, relay: RelayDriver<P>, soil: M) -> Self {
        Self {
            i2c,
            delay,
            climate: Aht21::default(),
            light: Bh1750::default(),
            tof: Vl53l0x::default(),
            soil,
            relay,
        }
    }

    /// Bring up every I2C device.  Individual failures are logged and the
    /// device is retried on its first read; the result reports whether all
    /// came up.
    pub fn init(&mut self) -> bool {
        let mut ok = true;
        if let Err(e) = self.climate.init(&mut self.i2c, &mut self.delay) {
            warn!("AHT21 init failed: {}", e);
            ok = false;
        }
        if let Err(e) = self.light.init(&mut self.i2c) {
            warn!("BH1750 init failed: {}", e);
            ok = false;
        }
        if let Err(e) = self.tof.init(&mut self.i2c) {
            warn!("VL53L0X init failed: {}", e);
            ok = false;
        }
        if ok {
            info!("HardwareAdapter: all I2C sensors initialised");
        }
        ok
    }

    pub fn relay_on(&self) -> bool {
        self.relay.is_on()
    }
}

// ── Sensor ports ──────────────────────────────────────────────

impl<I, D, P, M> MoistureSensor for HardwareAdapter<I, D, P, M>
where
    I: I2c,
    D: DelayNs,
    P: OutputPin,
    M: MoistureSensor,
{
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        self.soil.read_raw()
    }
}

impl<I, D, P, M> DistanceSensor for HardwareAdapter<I, D, P, M>
where
    I: I2c,
    D: DelayNs,
    P: OutputPin,
    M: MoistureSensor,
{
    fn read_distance_mm(&mut self) -> Result<f32, SensorError> {
        self.tof
            .read_range_mm(&mut self.i2c, &mut self.delay)
            .map(f32::from)
    }
}

impl<I, D, P, M> ClimateSensor for HardwareAdapter<I, D, P, M>
where
    I: I2c,
    D: DelayNs,
    P: OutputPin,
    M: MoistureSensor,
{
    fn measure(&mut self) -> Result<ClimateSample, SensorError> {
        self.climate.measure(&mut self.i2c, &mut self.delay)
    }
}

impl<I, D, P, M> LightSensor for HardwareAdapter<I, D, P, M>
where
    I: I2c,
    D: DelayNs,
    P: OutputPin,
    M: MoistureSensor,
{
    fn read_lux(&mut self) -> Result<f32, SensorError> {
        self.light.read_lux(&mut self.i2c, &mut self.delay)
    }
}

// ── Relay port ────────────────────────────────────────────────

impl<I, D, P, M> RelayOutput for HardwareAdapter<I, D, P, M>
where
    I: I2c,
    D: DelayNs,
    P: OutputPin,
    M: MoistureSensor,
{
    fn set_relay(&mut self, on: bool) {
        self.relay.set_relay(on);
    }
}
