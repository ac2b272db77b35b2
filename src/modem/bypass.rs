//! Session multiplexer: raw relays between the debug console and the
//! modem or GNSS channel.
//!
//! The plain variants make one pass over whatever is buffered right now
//! and return; callers invoke them from their main loop.  The CLI
//! variants take over the calling thread and relay until the operator
//! types [`EXIT_BYPASS_TOKEN`] on the debug console.  Read errors on
//! either side are treated as "nothing available".

use log::{debug, info};

use super::Modem;
use crate::app::ports::{AtPort, Clock, PowerControl, SerialPort};

/// Typed on the debug console to leave a CLI bypass.
pub const EXIT_BYPASS_TOKEN: &[u8] = b"exitbypass";

const RELAY_CHUNK: usize = 64;
/// Pause when neither side had data during a CLI relay iteration.
const IDLE_YIELD_MS: u32 = 1;

/// Streaming matcher for a fixed byte token.
#[derive(Debug, Clone)]
pub struct TokenMatcher {
    token: &'static [u8],
    matched: usize,
}

impl TokenMatcher {
    pub const fn new(token: &'static [u8]) -> Self {
        Self { token, matched: 0 }
    }

    /// Feed one byte.  Returns `true` when it completes the token.
    /// A mismatching byte that equals the token's first byte starts a
    /// new match.
    pub fn feed(&mut self, byte: u8) -> bool {
        if self.token.is_empty() {
            return false;
        }
        if self.token[self.matched] == byte {
            self.matched += 1;
        } else if self.token[0] == byte {
            self.matched = 1;
        } else {
            self.matched = 0;
        }
        if self.matched == self.token.len() {
            self.matched = 0;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.matched = 0;
    }
}

/// Copy everything currently available on `from` to `to`.
/// Returns the number of bytes moved.
fn relay_available<F, T>(from: &mut F, to: &mut T) -> usize
where
    F: SerialPort + ?Sized,
    T: SerialPort + ?Sized,
{
    let mut chunk = [0u8; RELAY_CHUNK];
    let mut moved = 0;
    while from.available() > 0 {
        let n = match from.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        let _ = to.write(&chunk[..n]);
        moved += n;
    }
    moved
}

/// Relay until `EXIT_BYPASS_TOKEN` arrives from `console`.  The device
/// side gets a trailing CR LF once the token has been forwarded.
fn relay_until_token<Dev, Con, Clk>(device: &mut Dev, console: &mut Con, clock: &mut Clk)
where
    Dev: SerialPort + ?Sized,
    Con: SerialPort + ?Sized,
    Clk: Clock + ?Sized,
{
    let mut matcher = TokenMatcher::new(EXIT_BYPASS_TOKEN);
    loop {
        let mut moved = relay_available(device, console);

        // Byte by byte so nothing typed after the token is consumed.
        while console.available() > 0 {
            let mut byte = [0u8; 1];
            match console.read(&mut byte) {
                Ok(1) => {}
                _ => break,
            }
            let _ = device.write(&byte);
            moved += 1;
            if matcher.feed(byte[0]) {
                let _ = device.write(b"\r\n");
                return;
            }
        }

        if moved == 0 {
            clock.delay_ms(IDLE_YIELD_MS);
        }
    }
}

impl<A, P, C, D, G> Modem<A, P, C, D, G>
where
    A: AtPort,
    P: PowerControl,
    C: Clock,
    D: SerialPort,
    G: SerialPort,
{
    /// One pass modem -> debug, then debug -> modem.
    pub fn bypass(&mut self) {
        let Some(debug_port) = self.debug.as_mut() else {
            return;
        };
        let modem = self.at.serial_mut();
        relay_available(modem, debug_port);
        relay_available(debug_port, modem);
    }

    /// One pass GNSS -> debug, then debug -> GNSS.
    pub fn bypass_gnss(&mut self) {
        let (Some(debug_port), Some(gnss)) = (self.debug.as_mut(), self.gnss.as_mut()) else {
            return;
        };
        relay_available(gnss, debug_port);
        relay_available(debug_port, gnss);
    }

    /// Interactive modem console.  Blocks until `exitbypass` is typed.
    pub fn bypass_cli(&mut self) {
        let Some(debug_port) = self.debug.as_mut() else {
            return;
        };
        info!("Entering modem bypass; type \"exitbypass\" to leave");
        self.in_bypass = true;
        relay_until_token(self.at.serial_mut(), debug_port, &mut self.clock);
        self.in_bypass = false;
        debug!("Left modem bypass");
    }

    /// Interactive GNSS console.  Blocks until `exitbypass` is typed.
    pub fn bypass_gnss_cli(&mut self) {
        let (Some(debug_port), Some(gnss)) = (self.debug.as_mut(), self.gnss.as_mut()) else {
            return;
        };
        info!("Entering GNSS bypass; type \"exitbypass\" to leave");
        self.in_bypass = true;
        relay_until_token(gnss, debug_port, &mut self.clock);
        self.in_bypass = false;
        debug!("Left GNSS bypass");
    }

    /// Whether a CLI bypass currently owns the session.
    pub fn in_bypass(&self) -> bool {
        self.in_bypass
    }
}
