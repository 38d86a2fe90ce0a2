//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements       | Connects to                   |
//! |----------------|------------------|-------------------------------|
//! | `config_file`  | ConfigPort       | JSON file on disk             |
//! | `gpio_sysfs`   | OutputPin (HAL)  | `/sys/class/gpio` lines       |
//! | `hardware`     | GpioPort         | bank of HAL output pins       |
//! | `http`         | TelemetryPort    | reqwest blocking client       |
//! | `log_sink`     | EventSink        | `log` facade                  |
//! | `mqtt`         | BrokerPort       | rumqttc sync client           |
//! | `serial_link`  | LineSource       | serialport device             |
//! | `time`         | ClockPort        | system wall clock             |
//! |                | DelayNs (HAL)    | `std::thread::sleep`          |

pub mod config_file;
pub mod gpio_sysfs;
pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod mqtt;
pub mod serial_link;
pub mod time;
