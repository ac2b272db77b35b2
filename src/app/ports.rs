//! Port traits, the hexagonal boundary between the modem core and the
//! outside world.
//!
//! ```text
//!   UART / mock ──▶ SerialPort ──▶ AtPort (engine) ──▶ Modem (domain)
//!   GPIO / mock ──▶ PowerControl ─────────────────────▶
//!   timer / mock ─▶ Clock ────────────────────────────▶
//! ```
//!
//! The [`Modem`](crate::modem::Modem) consumes these via generics, so the
//! lifecycle logic never touches a peripheral directly and every test can
//! script the module's answers and simulate time.
//!
//! Every port is also implemented for `&mut T`, so callers may lend a
//! channel to a session instead of handing over ownership.

use crate::error::AtResult;
use crate::span::ByteSpan;
use crate::urc::UrcHandler;

// ───────────────────────────────────────────────────────────────
// Serial channel (driven adapter: UART ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Byte-oriented serial channel.
pub trait SerialPort {
    /// Error type for this channel.
    type Error: core::fmt::Debug;

    /// Number of bytes that can be read right now without blocking.
    fn available(&mut self) -> usize;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the channel.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;
}

impl<T: SerialPort + ?Sized> SerialPort for &mut T {
    type Error = T::Error;

    fn available(&mut self) -> usize {
        (**self).available()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        (**self).write(data)
    }
}

/// A channel that never has data and discards all writes.
/// Stands in for the debug and GNSS channels when a board has none.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPort;

impl SerialPort for NullPort {
    type Error = core::convert::Infallible;

    fn available(&mut self) -> usize {
        0
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        Ok(data.len())
    }
}

// ───────────────────────────────────────────────────────────────
// Transaction engine (driven adapter: AT command/response)
// ───────────────────────────────────────────────────────────────

/// Command/response transaction engine over the modem channel.
///
/// Unsolicited result codes are only noticed while a transaction is in
/// flight; the engine hands each one to the `urc` handler supplied with
/// the call.  A line the handler does not consume is treated as part of
/// the response.
pub trait AtPort {
    /// The raw channel the engine talks over (used by the bypass relay).
    type Serial: SerialPort;

    /// Bring the AT terminal into a known state (echo off, verbose errors).
    fn init_terminal(&mut self) -> bool;

    /// Send `command` and block until a final result code or `timeout_ms`.
    ///
    /// On success the returned span holds the information-text lines of
    /// the response, valid until the next call.
    fn command(
        &mut self,
        command: &str,
        timeout_ms: u32,
        urc: &mut dyn UrcHandler,
    ) -> AtResult<ByteSpan<'_>>;

    /// Direct access to the underlying channel.
    fn serial_mut(&mut self) -> &mut Self::Serial;
}

impl<T: AtPort + ?Sized> AtPort for &mut T {
    type Serial = T::Serial;

    fn init_terminal(&mut self) -> bool {
        (**self).init_terminal()
    }

    fn command(
        &mut self,
        command: &str,
        timeout_ms: u32,
        urc: &mut dyn UrcHandler,
    ) -> AtResult<ByteSpan<'_>> {
        (**self).command(command, timeout_ms, urc)
    }

    fn serial_mut(&mut self) -> &mut Self::Serial {
        (**self).serial_mut()
    }
}

// ───────────────────────────────────────────────────────────────
// Power control (driven adapter: domain → GPIO)
// ───────────────────────────────────────────────────────────────

/// Opaque module power primitive.  Neither call waits for the module.
pub trait PowerControl {
    fn power_on(&mut self);
    fn power_off(&mut self);
}

impl<T: PowerControl + ?Sized> PowerControl for &mut T {
    fn power_on(&mut self) {
        (**self).power_on();
    }

    fn power_off(&mut self) {
        (**self).power_off();
    }
}

// ───────────────────────────────────────────────────────────────
// Clock (driven adapter: domain → timer)
// ───────────────────────────────────────────────────────────────

/// Monotonic time and blocking delay.  Every wait in the core goes
/// through this port so tests can run the supervisors in simulated time.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin (monotonic).
    fn now_ms(&self) -> u64;

    /// Block the calling thread for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms);
    }
}
