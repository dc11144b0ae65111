//! Fuzz target: `parse_payload`
//!
//! Feeds arbitrary MQTT payloads into the manual-command decoder and
//! asserts it never panics and only yields a command for the two exact
//! switch values.
//!
//! cargo fuzz run fuzz_command_payload

#![no_main]

use bloombuddy::app::commands::{parse_payload, ManualCommand};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(Some(cmd)) = parse_payload(data) {
        // A decoded command implies the payload was valid UTF-8 JSON
        // naming one of the two switch states.
        let text = core::str::from_utf8(data).expect("decoded payload must be UTF-8");
        let needle = match cmd {
            ManualCommand::On => "ON",
            ManualCommand::Off => "OFF",
        };
        assert!(text.contains(needle));
    }
});
