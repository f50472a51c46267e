//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                    |
//! |------------|----------------|--------------------------------|
//! | `hardware` | CaptureSource  | ISR rings (PCNT bins, test ISR)|
//! |            | SelfTestPort   | Open-drain test GPIO           |
//! | `log_sink` | EventSink      | Serial log output              |
//! |            | SensorChannel  | Serial log output              |
//! | `time`     | —              | ESP32 system timer             |

pub mod hardware;
pub mod log_sink;
pub mod time;
