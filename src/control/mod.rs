//! Actuation control.
//!
//! [`pump::PumpController`] owns the pump state machine and arbitrates
//! between the automatic threshold logic and manual overrides.

pub mod pump;
