//! Application boundary: the port traits the modem core is written
//! against.
//!
//! All interaction with serial hardware, the power pin and the system
//! timer happens through the traits in [`ports`], keeping the lifecycle
//! logic fully testable without a module attached.

pub mod ports;
