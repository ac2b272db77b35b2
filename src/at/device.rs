//! Host device registration.

use core::fmt::Write;

use super::{AtCommand, CommandBuf};
use crate::error::AtResult;
use crate::span::ByteSpan;

/// `AT+UHOSTDEV=<descriptor>`: report the host's identity to the module.
/// `descriptor` is sent verbatim, so it must already carry its quoting.
#[derive(Debug, Clone, Copy)]
pub struct SetHostDevice<'a> {
    pub descriptor: &'a str,
}

impl AtCommand for SetHostDevice<'_> {
    type Response = ();

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        write!(buf, "AT+UHOSTDEV={}", self.descriptor)
    }

    fn parse(&self, _response: ByteSpan<'_>) -> AtResult<()> {
        Ok(())
    }
}
