//! Pump relay driver.
//!
//! A single digital output switching the pump supply.  Polarity is
//! configurable because common relay modules are active-low.
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator.  The pump controller decides; the relay
//! only follows.  A failed pin write is logged and the last requested
//! state is still reported, so the next cycle's re-assert retries it.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::RelayOutput;

pub struct RelayDriver<P: OutputPin> {
    pin: P,
    active_low: bool,
    on: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Take the pin and drive it to the OFF level immediately.
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut relay = Self {
            pin,
            active_low,
            on: false,
        };
        relay.write(false);
        relay
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    fn write(&mut self, on: bool) {
        let high = on != self.active_low;
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if res.is_err() {
            warn!("relay: pin write failed (requested {})", if on { "ON" } else { "OFF" });
        }
        self.on = on;
    }
}

impl<P: OutputPin> RelayOutput for RelayDriver<P> {
    fn set_relay(&mut self, on: bool) {
        self.write(on);
    }
}
