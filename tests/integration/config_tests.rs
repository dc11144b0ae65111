//! Configuration persistence through the `ConfigPort` seam.

use bloombuddy::adapters::nvs::{load_or_default, NvsAdapter};
use bloombuddy::app::ports::{ConfigError, ConfigPort};
use bloombuddy::app::service::ControlLoop;
use bloombuddy::config::{IdleExtension, SystemConfig};
use bloombuddy::sensors::moisture::Calibration;

#[test]
fn stored_config_reaches_the_control_loop() {
    let nvs = NvsAdapter::new().unwrap();
    let cfg = SystemConfig {
        low_moisture_threshold_pct: 30,
        calibration: Calibration {
            dry_raw: 3200,
            wet_raw: 1500,
            ..Calibration::default()
        },
        idle_extension: Some(IdleExtension {
            moisture_threshold_pct: 90,
            sleep_ms: 60_000,
        }),
        ..SystemConfig::default()
    };
    nvs.save(&cfg).unwrap();

    let ctl = ControlLoop::new(load_or_default(&nvs)).unwrap();
    assert_eq!(ctl.config(), &cfg);
}

#[test]
fn extension_at_or_below_low_threshold_is_refused() {
    let nvs = NvsAdapter::new().unwrap();
    let cfg = SystemConfig {
        idle_extension: Some(IdleExtension {
            moisture_threshold_pct: 40,
            sleep_ms: 30_000,
        }),
        ..SystemConfig::default()
    };
    assert!(matches!(nvs.save(&cfg), Err(ConfigError::ValidationFailed(_))));
    assert_eq!(load_or_default(&nvs), SystemConfig::default());
}
