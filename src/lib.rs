//! SARA-R4/N4 cellular modem lifecycle library.
//!
//! Powers the module on, reconciles its operator profile and band plan,
//! supervises network attach with forced resets, registers host identity
//! metadata, and multiplexes the serial channels between AT traffic, URC
//! delivery, a debug console bypass and a bounded GNSS receive buffer.
//!
//! Everything is written against the traits in [`app::ports`]; the
//! ESP-IDF specific adapters are gated behind the `espidf` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod at;
pub mod config;
pub mod error;
pub mod fsm;
pub mod modem;
pub mod span;
pub mod urc;

pub use app::ports::{AtPort, Clock, NullPort, PowerControl, SerialPort};
pub use config::{BehaviorFlags, HostDeviceProfile, ModemConfig, RegionOverrides};
pub use error::{AtResult, CommandError, Error, Result};
pub use modem::{GnssBuffer, Modem, PowerState};
pub use span::ByteSpan;
pub use urc::{EventSubscribers, UrcHandler};
