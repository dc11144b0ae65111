//! GPIO / peripheral pin assignments for the BloomBuddy board.
//!
//! The binary references this module rather than hard-coding pin numbers.  The `esp-idf-hal` pin types are picked in
//! `main.rs` to match.

// ---------------------------------------------------------------------------
// I2C bus (AHT21, BH1750 and VL53L0X share it)
// ---------------------------------------------------------------------------

pub const I2C_SCL_GPIO: i32 = 4;
pub const I2C_SDA_GPIO: i32 = 5;
/// Standard-mode bus clock.
pub const I2C_BAUDRATE_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Pump relay (IN1 of the relay module)
// ---------------------------------------------------------------------------

/// Digital output, HIGH = pump on.
pub const RELAY_GPIO: i32 = 7;
pub const RELAY_ACTIVE_LOW: bool = false;

// ---------------------------------------------------------------------------
// Capacitive soil moisture sensor v2.0
// ---------------------------------------------------------------------------

/// Analog output, 11 dB attenuation, 12-bit conversion.
pub const SOIL_ADC_GPIO: i32 = 15;
