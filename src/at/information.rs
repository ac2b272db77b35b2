//! Product identification queries (`+CGMI`, `+CGMM`, `+CGMR`, `+CGSN`).

use core::fmt::Write;

use super::{AtCommand, CommandBuf};
use crate::error::AtResult;
use crate::span::ByteSpan;

/// Which identification string to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoField {
    Manufacturer,
    Model,
    Revision,
    Imei,
}

impl InfoField {
    fn command(self) -> &'static str {
        match self {
            Self::Manufacturer => "AT+CGMI",
            Self::Model => "AT+CGMM",
            Self::Revision => "AT+CGMR",
            Self::Imei => "AT+CGSN",
        }
    }
}

/// Read one identification string.  The response is the bare text line,
/// returned with surrounding whitespace removed.
#[derive(Debug, Clone, Copy)]
pub struct GetDeviceInfo(pub InfoField);

impl AtCommand for GetDeviceInfo {
    type Response = Vec<u8>;

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        buf.write_str(self.0.command())
    }

    fn parse(&self, response: ByteSpan<'_>) -> AtResult<Vec<u8>> {
        Ok(response.trim().to_vec())
    }
}
