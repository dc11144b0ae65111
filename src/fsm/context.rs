//! Shared mutable context threaded through every pump state handler.
//!
//! `PumpContext` is the single struct that state handlers read from and
//! write to: the latest moisture reading, the monotonic clock sample for
//! this evaluation, the relay output and the activation timestamp.  The
//! [`PumpController`](crate::control::pump::PumpController) is its only
//! owner, so there is exactly one writer of pump state.

use crate::config::SystemConfig;

/// Relay output requested by the state handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relay {
    On,
    Off,
}

impl Relay {
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// The shared context passed to every state handler function.
#[derive(Debug, Clone)]
pub struct PumpContext {
    // -- Inputs --
    /// Moisture (%) fed into the current evaluation.  `None` until the
    /// first successful reading.
    pub moisture_pct: Option<u8>,
    /// Monotonic ms at which the current input was taken.
    pub now_ms: u64,

    // -- Outputs --
    pub relay: Relay,
    /// Monotonic ms at which the pump was last switched on.
    pub activation_ms: Option<u64>,

    // -- Configuration --
    pub low_threshold_pct: u8,
    pub run_duration_ms: u64,
}

impl PumpContext {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            moisture_pct: None,
            now_ms: 0,
            relay: Relay::Off,
            activation_ms: None,
            low_threshold_pct: config.low_moisture_threshold_pct,
            run_duration_ms: config.pump_run_duration_ms as u64,
        }
    }

    /// Milliseconds since activation, or `None` if the pump is not stamped.
    pub fn elapsed_ms(&self) -> Option<u64> {
        self.activation_ms
            .map(|start| self.now_ms.saturating_sub(start))
    }

    /// Relay on, activation stamped at the current input time.
    pub fn switch_on(&mut self) {
        self.relay = Relay::On;
        self.activation_ms = Some(self.now_ms);
    }

    /// Relay off, activation cleared.
    pub fn switch_off(&mut self) {
        self.relay = Relay::Off;
        self.activation_ms = None;
    }
}
