//! Line-oriented AT transaction engine over any [`SerialPort`].
//!
//! ```text
//!   command ──▶ "<cmd>\r\n" ──▶ serial
//!   serial ──▶ LineDecoder ──▶ echo?  skip
//!                          ──▶ OK / ERROR / +CME ERROR   final result
//!                          ──▶ "+XXX: data"  offered to the UrcHandler
//!                          ──▶ anything else  appended to the response
//! ```
//!
//! Bytes that arrive after the final result code stay staged and are
//! processed by the next transaction, so URCs are never dropped between
//! commands.

use log::{debug, trace, warn};

use crate::app::ports::{AtPort, Clock, SerialPort};
use crate::error::{AtResult, CommandError};
use crate::span::ByteSpan;
use crate::urc::{IgnoreUrcs, UrcHandler};

/// Longest line the decoder keeps; longer lines are discarded whole.
pub const MAX_LINE: usize = 512;
/// Capacity of the information-text response buffer.
pub const MAX_RESPONSE: usize = 1024;

const RX_CHUNK: usize = 64;

// ---------------------------------------------------------------------------
// Line decoder
// ---------------------------------------------------------------------------

/// Streaming CR/LF line splitter.
pub struct LineDecoder {
    line: heapless::Vec<u8, MAX_LINE>,
    overflowed: bool,
    ready: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            line: heapless::Vec::new(),
            overflowed: false,
            ready: false,
        }
    }

    /// Feed one byte.  Returns a complete, non-empty line (without its
    /// terminator) when `byte` ends one.  The slice is valid until the
    /// next call.
    pub fn push(&mut self, byte: u8) -> Option<&[u8]> {
        if self.ready {
            self.line.clear();
            self.ready = false;
        }
        match byte {
            b'\r' | b'\n' => {
                if self.overflowed {
                    warn!("Discarding overlong line ({}+ bytes)", MAX_LINE);
                    self.overflowed = false;
                    self.line.clear();
                    return None;
                }
                if self.line.is_empty() {
                    return None;
                }
                self.ready = true;
                Some(self.line.as_slice())
            }
            _ => {
                if self.line.push(byte).is_err() {
                    self.overflowed = true;
                }
                None
            }
        }
    }

    /// Forget any partial line.
    pub fn reset(&mut self) {
        self.line.clear();
        self.overflowed = false;
        self.ready = false;
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Engine tunables.
#[derive(Debug, Clone, Copy)]
pub struct AtEngineConfig {
    /// Sleep between polls while waiting for input.
    pub poll_interval_ms: u32,
    /// Timeout for each command of the terminal init sequence.
    pub init_timeout_ms: u32,
}

impl Default for AtEngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5,
            init_timeout_ms: 1_000,
        }
    }
}

enum LineOutcome {
    Continue,
    Ok,
    Failed,
}

/// Reference [`AtPort`] implementation.
pub struct SerialAtEngine<S, C> {
    serial: S,
    clock: C,
    config: AtEngineConfig,
    decoder: LineDecoder,
    response: heapless::Vec<u8, MAX_RESPONSE>,
    rx: [u8; RX_CHUNK],
    rx_pos: usize,
    rx_len: usize,
}

impl<S: SerialPort, C: Clock> SerialAtEngine<S, C> {
    pub fn new(serial: S, clock: C) -> Self {
        Self::with_config(serial, clock, AtEngineConfig::default())
    }

    pub fn with_config(serial: S, clock: C, config: AtEngineConfig) -> Self {
        Self {
            serial,
            clock,
            config,
            decoder: LineDecoder::new(),
            response: heapless::Vec::new(),
            rx: [0; RX_CHUNK],
            rx_pos: 0,
            rx_len: 0,
        }
    }

    pub fn into_inner(self) -> (S, C) {
        (self.serial, self.clock)
    }

    /// Next received byte, refilling the staging buffer from the serial
    /// port when it runs dry.  Read errors count as "nothing yet".
    fn next_byte(&mut self) -> Option<u8> {
        if self.rx_pos == self.rx_len {
            if self.serial.available() == 0 {
                return None;
            }
            match self.serial.read(&mut self.rx) {
                Ok(n) if n > 0 => {
                    self.rx_pos = 0;
                    self.rx_len = n.min(RX_CHUNK);
                }
                Ok(_) => return None,
                Err(e) => {
                    debug!("Serial read failed: {e:?}");
                    return None;
                }
            }
        }
        let byte = self.rx[self.rx_pos];
        self.rx_pos += 1;
        Some(byte)
    }

    fn send_line(&mut self, command: &str) -> AtResult<()> {
        trace!("AT >> {command}");
        for part in [command.as_bytes(), b"\r\n".as_slice()] {
            match self.serial.write(part) {
                Ok(n) if n == part.len() => {}
                Ok(n) => {
                    warn!("Short write of {command:?}: {n} of {} bytes", part.len());
                    return Err(CommandError::Protocol);
                }
                Err(e) => {
                    warn!("Write of {command:?} failed: {e:?}");
                    return Err(CommandError::Protocol);
                }
            }
        }
        Ok(())
    }
}

fn classify(
    line: &[u8],
    command: &str,
    urc: &mut dyn UrcHandler,
    response: &mut heapless::Vec<u8, MAX_RESPONSE>,
) -> LineOutcome {
    let span = ByteSpan::new(line).trim();
    trace!("AT << {span}");

    if span.as_bytes() == command.as_bytes() {
        return LineOutcome::Continue;
    }
    if span.as_bytes() == b"OK" {
        return LineOutcome::Ok;
    }
    if span.as_bytes() == b"ERROR"
        || span.starts_with(b"+CME ERROR")
        || span.starts_with(b"+CMS ERROR")
    {
        debug!("{command} failed: {span}");
        return LineOutcome::Failed;
    }
    if span.starts_with(b"+") {
        if let Some((code, data)) = span.split_once(b':') {
            if urc.handle_urc(code.trim(), data.trim()) {
                return LineOutcome::Continue;
            }
        }
    }

    let separator: &[u8] = if response.is_empty() { b"" } else { b"\n" };
    if response.extend_from_slice(separator).is_err() || response.extend_from_slice(&span).is_err() {
        warn!("Response to {command} exceeds {MAX_RESPONSE} bytes; dropping {span}");
    }
    LineOutcome::Continue
}

impl<S: SerialPort, C: Clock> AtPort for SerialAtEngine<S, C> {
    type Serial = S;

    fn init_terminal(&mut self) -> bool {
        let timeout = self.config.init_timeout_ms;
        ["AT", "ATE0", "AT+CMEE=2"]
            .into_iter()
            .all(|cmd| self.command(cmd, timeout, &mut IgnoreUrcs).is_ok())
    }

    fn command(
        &mut self,
        command: &str,
        timeout_ms: u32,
        urc: &mut dyn UrcHandler,
    ) -> AtResult<ByteSpan<'_>> {
        self.response.clear();
        self.send_line(command)?;

        let deadline = self.clock.now_ms().saturating_add(u64::from(timeout_ms));
        loop {
            let Some(byte) = self.next_byte() else {
                if self.clock.now_ms() > deadline {
                    debug!("{command} timed out after {timeout_ms} ms");
                    return Err(CommandError::Timeout);
                }
                self.clock.delay_ms(self.config.poll_interval_ms);
                continue;
            };
            let Some(line) = self.decoder.push(byte) else {
                continue;
            };
            match classify(line, command, urc, &mut self.response) {
                LineOutcome::Continue => {}
                LineOutcome::Ok => return Ok(ByteSpan::new(&self.response)),
                LineOutcome::Failed => return Err(CommandError::Protocol),
            }
        }
    }

    fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }
}
