//! AT command encoders.
//!
//! Each command is a stateless formatter/parser pair: [`AtCommand::write`]
//! renders the command text into a fixed-capacity buffer and
//! [`AtCommand::parse`] turns the engine's response span into a typed
//! value.  The session sends them with
//! [`Modem::send`](crate::modem::Modem::send).
//!
//! | Module        | Commands                                       |
//! |---------------|------------------------------------------------|
//! | `network`     | `+UMNOPROF`, `+COPS`, `+CFUN`, `+CEREG`, `+URAT`, `+UBANDMASK`, `+CGDCONT` |
//! | `information` | `+CGMI`, `+CGMM`, `+CGMR`, `+CGSN`              |
//! | `sim`         | `+CPIN`, `+CCID`, `+CIMI`                       |
//! | `device`      | `+UHOSTDEV`                                     |

pub mod device;
pub mod information;
pub mod network;
pub mod sim;

use core::fmt::Write;

use crate::error::AtResult;
use crate::span::ByteSpan;

/// Longest command line we ever render (host descriptor plus prefix).
pub const MAX_COMMAND_LEN: usize = 320;

/// Buffer a command is rendered into.
pub type CommandBuf = heapless::String<MAX_COMMAND_LEN>;

/// Timeout for short configuration commands.
pub const DEFAULT_TIMEOUT_MS: u32 = 1_000;

/// A typed AT command.
pub trait AtCommand {
    /// Value produced from a successful response.
    type Response;

    /// How long the engine waits for the final result code.
    fn timeout_ms(&self) -> u32 {
        DEFAULT_TIMEOUT_MS
    }

    /// Render the full command line (without the trailing CR).
    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result;

    /// Interpret the information text of a successful response.
    fn parse(&self, response: ByteSpan<'_>) -> AtResult<Self::Response>;
}

/// A fixed command whose response carries nothing of interest.
#[derive(Debug, Clone, Copy)]
pub struct Raw<'a> {
    pub text: &'a str,
    pub timeout_ms: u32,
}

impl<'a> Raw<'a> {
    pub const fn new(text: &'a str, timeout_ms: u32) -> Self {
        Self { text, timeout_ms }
    }
}

impl AtCommand for Raw<'_> {
    type Response = ();

    fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        buf.push_str(self.text).map_err(|()| core::fmt::Error)
    }

    fn parse(&self, _response: ByteSpan<'_>) -> AtResult<()> {
        Ok(())
    }
}

/// Render `cmd` into a fresh buffer.  `None` if it does not fit.
pub fn render<C: AtCommand + ?Sized>(cmd: &C) -> Option<CommandBuf> {
    let mut buf = CommandBuf::new();
    cmd.write(&mut buf).ok()?;
    Some(buf)
}

/// `fmt::Write` adaptor that keeps as much text as fits and silently
/// drops the rest, cutting on a character boundary.
pub struct BoundedWriter<'a, const N: usize> {
    out: &'a mut heapless::String<N>,
}

impl<'a, const N: usize> BoundedWriter<'a, N> {
    pub fn new(out: &'a mut heapless::String<N>) -> Self {
        Self { out }
    }
}

impl<const N: usize> Write for BoundedWriter<'_, N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        if self.out.push_str(s).is_ok() {
            return Ok(());
        }
        for ch in s.chars() {
            if self.out.push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}
