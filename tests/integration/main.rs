//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below exercises one lifecycle operation of the modem
//! session against the simulated module in `mock_modem`.  All tests run
//! on the host with simulated time; no hardware is required.

mod init_tests;
mod mock_modem;
mod power_tests;
mod registration_tests;
