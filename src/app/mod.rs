//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the watering controller:
//! manual command decoding, the per-cycle orchestration and the events it
//! reports.  All interaction with hardware and the network happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
