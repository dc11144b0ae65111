//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements                 | Connects to                 |
//! |-----------------|----------------------------|-----------------------------|
//! | `hardware`      | sensor ports, RelayOutput  | I2C sensors, soil ADC, relay|
//! | `command_queue` | CommandChannel             | embassy-sync channel        |
//! | `mqtt`          | TelemetrySink              | ESP-IDF MQTT client         |
//! |                 | CommandChannel             | (via `command_queue`)       |
//! | `log_sink`      | EventSink                  | Serial log output           |
//! | `nvs`           | ConfigPort                 | NVS / in-memory store       |
//! | `time`          | Clock                      | ESP32 system timer          |
//! | `wifi`          | -                          | ESP-IDF WiFi STA            |

pub mod command_queue;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod time;
pub mod wifi;
