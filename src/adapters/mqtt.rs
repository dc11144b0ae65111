//! MQTT link to the Node-RED dashboard.
//!
//! Telemetry goes out as a flat JSON object on the plant topic; the same
//! topic carries the dashboard's pump switch.  The wire format is fixed by
//! the existing flow:
//!
//! ```text
//! {"Fuellstand":120,"Temperatur":21,"Luftfeuchtigkeit":48,"Helligkeit":310,"Bodenfeuchtigkeit":55}
//! ```
//!
//! Whole numbers are written as JSON integers, fractional values (only
//! with `climate_decimals > 0`) as JSON numbers.
//!
//! ## cfg gating
//!
//! - Payload encoding is plain serde and compiles everywhere.
//! - [`MqttLink`] wraps `esp_idf_svc::mqtt::client::EspMqttClient` and
//!   exists only on **`target_os = "espidf"`**.

use serde::{Serialize, Serializer};

use crate::app::events::TelemetrySnapshot;
use crate::error::CommsError;

#[derive(Serialize)]
struct TelemetryPayload {
    #[serde(rename = "Fuellstand", serialize_with = "compact_number")]
    fill_level_mm: f32,
    #[serde(rename = "Temperatur", serialize_with = "compact_number")]
    temperature_c: f32,
    #[serde(rename = "Luftfeuchtigkeit", serialize_with = "compact_number")]
    humidity_pct: f32,
    #[serde(rename = "Helligkeit", serialize_with = "compact_number")]
    illuminance_lux: f32,
    #[serde(rename = "Bodenfeuchtigkeit")]
    soil_moisture_pct: u8,
}

impl From<&TelemetrySnapshot> for TelemetryPayload {
    fn from(s: &TelemetrySnapshot) -> Self {
        Self {
            fill_level_mm: s.fill_level_mm,
            temperature_c: s.temperature_c,
            humidity_pct: s.humidity_pct,
            illuminance_lux: s.illuminance_lux,
            soil_moisture_pct: s.soil_moisture_pct,
        }
    }
}

/// Largest magnitude at which every integer is exact in an f32.
const EXACT_INT_LIMIT: f32 = 16_777_216.0;

fn compact_number<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    let v = *value;
    if v.is_finite() && v.fract() == 0.0 && v.abs() <= EXACT_INT_LIMIT {
        serializer.serialize_i64(v as i64)
    } else {
        serializer.serialize_f32(v)
    }
}

/// Render a snapshot in the dashboard's JSON format.
pub fn encode_telemetry(snapshot: &TelemetrySnapshot) -> Result<String, CommsError> {
    serde_json::to_string(&TelemetryPayload::from(snapshot)).map_err(|_| CommsError::Encode)
}

#[cfg(target_os = "espidf")]
pub use esp_impl::MqttLink;

#[cfg(target_os = "espidf")]
mod esp_impl {
    use core::sync::atomic::{AtomicBool, Ordering};

    use esp_idf_svc::mqtt::client::{
        EspMqttClient, EventPayload, MqttClientConfiguration, QoS,
    };
    use esp_idf_svc::sys::EspError;
    use log::{info, warn};

    use super::encode_telemetry;
    use crate::adapters::command_queue::{CommandQueue, CommandSender, COMMAND_QUEUE};
    use crate::app::commands::ManualCommand;
    use crate::app::events::TelemetrySnapshot;
    use crate::app::ports::{CommandChannel, TelemetrySink};
    use crate::config::MqttConfig;
    use crate::error::{CommandError, CommsError};

    static CONNECTED: AtomicBool = AtomicBool::new(false);

    const SUBSCRIBE_ATTEMPTS: u32 = 20;
    const SUBSCRIBE_RETRY_MS: u32 = 250;

    /// Broker session: publishes telemetry, feeds the command queue.
    pub struct MqttLink {
        client: EspMqttClient<'static>,
        topic: heapless::String<64>,
        commands: CommandQueue<'static>,
    }

    impl MqttLink {
        /// Connect, subscribe to the plant topic and start routing
        /// switch messages into [`COMMAND_QUEUE`].
        pub fn connect(config: &MqttConfig) -> Result<Self, EspError> {
            let conf = MqttClientConfiguration {
                client_id: Some(config.client_id.as_str()),
                ..Default::default()
            };

            let sender = CommandSender::new(&COMMAND_QUEUE);
            let mut client =
                EspMqttClient::new_cb(config.broker_url.as_str(), &conf, move |event| {
                    match event.payload() {
                        EventPayload::Connected(_) => {
                            CONNECTED.store(true, Ordering::Release);
                            info!("MQTT: connected");
                        }
                        EventPayload::Disconnected => {
                            CONNECTED.store(false, Ordering::Release);
                            warn!("MQTT: disconnected");
                        }
                        EventPayload::Received { data, .. } => {
                            sender.push_payload(data);
                        }
                        EventPayload::Error(e) => warn!("MQTT: {:?}", e),
                        _ => {}
                    }
                })?;

            // The session comes up asynchronously; subscribe once it accepts.
            let mut attempt = 0;
            loop {
                match client.subscribe(config.topic.as_str(), QoS::AtMostOnce) {
                    Ok(_) => break,
                    Err(e) if attempt < SUBSCRIBE_ATTEMPTS => {
                        attempt += 1;
                        warn!("MQTT: subscribe attempt {} failed ({})", attempt, e);
                        esp_idf_hal::delay::FreeRtos::delay_ms(SUBSCRIBE_RETRY_MS);
                    }
                    Err(e) => return Err(e),
                }
            }
            info!("MQTT: subscribed to '{}'", config.topic);

            let mut commands = CommandQueue::new(&COMMAND_QUEUE);
            commands.clear();

            Ok(Self {
                client,
                topic: config.topic.clone(),
                commands,
            })
        }

        pub fn is_connected(&self) -> bool {
            CONNECTED.load(Ordering::Acquire)
        }
    }

    impl TelemetrySink for MqttLink {
        fn publish(&mut self, snapshot: &TelemetrySnapshot) -> Result<(), CommsError> {
            if !self.is_connected() {
                return Err(CommsError::Disconnected);
            }
            let payload = encode_telemetry(snapshot)?;
            self.client
                .enqueue(self.topic.as_str(), QoS::AtMostOnce, false, payload.as_bytes())
                .map(|_| ())
                .map_err(|e| {
                    warn!("MQTT: enqueue failed ({})", e);
                    CommsError::PublishFailed
                })
        }
    }

    impl CommandChannel for MqttLink {
        fn poll_pending(&mut self) -> Result<Option<ManualCommand>, CommandError> {
            self.commands.poll_pending()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> TelemetrySnapshot {
        TelemetrySnapshot {
            fill_level_mm: 120.0,
            temperature_c: 21.0,
            humidity_pct: 48.0,
            illuminance_lux: 310.0,
            soil_moisture_pct: 55,
            timestamp_ms: 99_000,
        }
    }

    #[test]
    fn dashboard_keys_and_integer_values() {
        let json = encode_telemetry(&snapshot()).unwrap();
        assert_eq!(
            json,
            r#"{"Fuellstand":120,"Temperatur":21,"Luftfeuchtigkeit":48,"Helligkeit":310,"Bodenfeuchtigkeit":55}"#
        );
    }

    #[test]
    fn fractional_climate_values_keep_decimals() {
        let mut s = snapshot();
        s.temperature_c = 21.5;
        s.humidity_pct = 48.25;
        let v: serde_json::Value = serde_json::from_str(&encode_telemetry(&s).unwrap()).unwrap();
        assert_eq!(v["Temperatur"], serde_json::json!(21.5));
        assert_eq!(v["Luftfeuchtigkeit"], serde_json::json!(48.25));
        assert_eq!(v["Fuellstand"], serde_json::json!(120));
    }

    #[test]
    fn negative_whole_temperature_is_an_integer() {
        let mut s = snapshot();
        s.temperature_c = -3.0;
        let json = encode_telemetry(&s).unwrap();
        assert!(json.contains(r#""Temperatur":-3,"#));
    }

    #[test]
    fn own_telemetry_is_not_a_command() {
        let json = encode_telemetry(&snapshot()).unwrap();
        assert_eq!(crate::app::commands::parse_payload(json.as_bytes()), Ok(None));
    }
}
