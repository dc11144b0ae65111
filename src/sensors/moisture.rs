//! Capacitive soil moisture sensor (v2.0) calibration.
//!
//! The sensor's analog output *falls* as the soil gets wetter, so the dry
//! anchor carries the larger raw count.  A two-point linear map turns the
//! 12-bit ADC count into a percentage, which is clamped to 0–100 because
//! readings drift past either anchor with temperature and soil type.

use serde::{Deserialize, Serialize};

/// Dry / wet anchors: raw ADC count and the percentage it represents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub dry_raw: u16,
    pub wet_raw: u16,
    pub dry_pct: f32,
    pub wet_pct: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            dry_raw: 3070,
            wet_raw: 1700,
            dry_pct: 0.0,
            wet_pct: 100.0,
        }
    }
}

impl Calibration {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.dry_raw == self.wet_raw {
            return Err("calibration dry_raw and wet_raw must differ");
        }
        if !(0.0..=100.0).contains(&self.dry_pct) || !(0.0..=100.0).contains(&self.wet_pct) {
            return Err("calibration percentages must be 0–100");
        }
        Ok(())
    }
}

/// Converts raw soil ADC counts into a 0–100 % moisture reading.
#[derive(Debug, Clone, Copy)]
pub struct MoistureReader {
    cal: Calibration,
}

impl MoistureReader {
    pub fn new(cal: Calibration) -> Self {
        Self { cal }
    }

    pub fn percent(&self, raw: u16) -> u8 {
        percent(raw, &self.cal)
    }
}

/// Two-point linear map from raw ADC count to moisture %, clamped and
/// rounded (ties to even).
pub fn percent(raw: u16, cal: &Calibration) -> u8 {
    let span = cal.dry_raw as f64 - cal.wet_raw as f64;
    if span == 0.0 {
        // Unreachable: ControlLoop refuses a config that fails validation.
        return 0;
    }
    let normalised = (raw as f64 - cal.wet_raw as f64) / span;
    let pct = normalised * (cal.dry_pct as f64 - cal.wet_pct as f64) + cal.wet_pct as f64;
    pct.clamp(0.0, 100.0).round_ties_even() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_anchor_reads_zero() {
        let cal = Calibration::default();
        assert_eq!(percent(3070, &cal), 0);
    }

    #[test]
    fn wet_anchor_reads_hundred() {
        let cal = Calibration::default();
        assert_eq!(percent(1700, &cal), 100);
    }

    #[test]
    fn midpoint_reads_fifty() {
        let cal = Calibration::default();
        // (2385 - 1700) / 1370 = 0.5
        assert_eq!(percent(2385, &cal), 50);
    }

    #[test]
    fn beyond_anchors_is_clamped() {
        let cal = Calibration::default();
        assert_eq!(percent(4095, &cal), 0);
        assert_eq!(percent(0, &cal), 100);
    }

    #[test]
    fn lower_raw_means_wetter() {
        let cal = Calibration::default();
        assert!(percent(2000, &cal) > percent(2800, &cal));
    }

    #[test]
    fn reader_uses_its_calibration() {
        let reader = MoistureReader::new(Calibration::default());
        assert_eq!(reader.percent(3070), 0);
        let wider = MoistureReader::new(Calibration {
            dry_raw: 3500,
            ..Calibration::default()
        });
        assert!(wider.percent(3070) > 0);
    }

    #[test]
    fn validation_rejects_equal_anchors() {
        let cal = Calibration {
            dry_raw: 2000,
            wet_raw: 2000,
            ..Calibration::default()
        };
        assert!(cal.validate().is_err());
        assert_eq!(percent(2000, &cal), 0);
    }
}
