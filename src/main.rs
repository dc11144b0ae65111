//! BloomBuddy Firmware — Main Entry Point
//!
//! Hexagonal architecture: the control loop sees only port traits, the
//! adapters below own the ESP-IDF peripherals.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        MqttLink            LogEventSink       │
//! │  (Sensors + Relay)      (Telemetry+Cmds)    (EventSink)        │
//! │  NvsAdapter             SystemClock                            │
//! │  (ConfigPort)           (Clock)                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  PumpController · SensorAggregator · MoistureReader    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::Delay;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use bloombuddy::adapters::hardware::HardwareAdapter;
use bloombuddy::adapters::log_sink::LogEventSink;
use bloombuddy::adapters::mqtt::MqttLink;
use bloombuddy::adapters::nvs::{load_or_default, NvsAdapter};
use bloombuddy::adapters::time::SystemClock;
use bloombuddy::adapters::wifi::{self, WifiCredentials};
use bloombuddy::app::service::ControlLoop;
use bloombuddy::config::{MqttConfig, SystemConfig};
use bloombuddy::drivers::relay::RelayDriver;
use bloombuddy::drivers::soil_adc::SoilAdc;
use bloombuddy::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  BloomBuddy v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new() {
        Ok(nvs) => load_or_default(&nvs),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults", e);
            SystemConfig::default()
        }
    };
    info!(
        "Config: threshold {}%, run {} ms, cycle {} ms",
        config.low_moisture_threshold_pct, config.pump_run_duration_ms, config.cycle_interval_ms
    );

    // ── 3. Hardware ───────────────────────────────────────────
    // The relay is driven OFF before anything slow happens.
    let relay = RelayDriver::new(
        PinDriver::output(peripherals.pins.gpio7)?,
        pins::RELAY_ACTIVE_LOW,
    );
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio5,
        peripherals.pins.gpio4,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_BAUDRATE_HZ)),
    )?;
    let soil = SoilAdc::new(peripherals.adc2, peripherals.pins.gpio15)?;

    let mut hw = HardwareAdapter::new(i2c, Delay::new_default(), relay, soil);
    if !hw.init() {
        warn!("Some sensors failed to initialise; cycles will abort until they answer");
    }

    // ── 4. Network ────────────────────────────────────────────
    let creds = WifiCredentials::from_build_env()?;
    let _wifi = wifi::connect(peripherals.modem, sysloop, nvs_partition, &creds)?;
    let mut link = MqttLink::connect(&MqttConfig::default())?;

    // ── 5. Control loop ───────────────────────────────────────
    let mut clock = SystemClock::new();
    let mut sink = LogEventSink::new();
    let mut control = ControlLoop::new(config)?;
    control.start(&mut hw, &mut sink);

    info!("System ready. Entering control loop.");
    let fatal = control.run(&mut hw, &mut link, &mut clock, &mut sink);
    Err(fatal.into())
}
