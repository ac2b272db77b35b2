//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter     | Implements   | Connects to                     |
//! |-------------|--------------|---------------------------------|
//! | `at_engine` | AtPort       | any SerialPort (line protocol)  |
//! | `power_pin` | PowerControl | embedded-hal output pin         |
//! | `time`      | Clock        | ESP32 system timer / std        |
//! | `uart`      | SerialPort   | ESP-IDF UART driver             |

pub mod at_engine;
pub mod power_pin;
pub mod time;
#[cfg(feature = "espidf")]
pub mod uart;
