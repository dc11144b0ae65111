//! Inbound manual override commands.
//!
//! The Node-RED dashboard publishes `{"Schalter1":"ON"}` or
//! `{"Schalter1":"OFF"}` on the plant topic.  Anything else is rejected
//! and the pump keeps its current state.

use serde::Deserialize;

use crate::error::CommandError;

/// Switch state requested by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualCommand {
    /// Force the pump on until an explicit OFF arrives.
    On,
    /// Stop the pump and release control.
    Off,
}

#[derive(Deserialize)]
struct SwitchPayload<'a> {
    #[serde(rename = "Schalter1", borrow)]
    switch: Option<&'a str>,
}

/// Decode a raw MQTT payload into a command.
///
/// Our own telemetry echoes back on the same topic; it carries no switch
/// field and decodes to `Ok(None)`.
pub fn parse_payload(payload: &[u8]) -> Result<Option<ManualCommand>, CommandError> {
    let msg: SwitchPayload<'_> =
        serde_json::from_slice(payload).map_err(|_| CommandError::Malformed)?;
    match msg.switch {
        None => Ok(None),
        Some("ON") => Ok(Some(ManualCommand::On)),
        Some("OFF") => Ok(Some(ManualCommand::Off)),
        Some(_) => Err(CommandError::UnknownState),
    }
}
