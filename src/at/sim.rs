//! SIM card queries.

use core::fmt::Write;

use super::{AtCommand, CommandBuf};
use crate::error::AtResult;
use crate::span::ByteSpan;

/// `AT+CPIN?`.  The status itself arrives as a `+CPIN` line which the
/// engine offers to the URC subscribers, so the response carries nothing.
#[derive(Debug, Clone, Copy)]
pub struct GetPinStatus {
    pub timeout_ms: u32,
}

impl AtCommand for GetPinStatus {
    type Response = ();

    fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        buf.write_str("AT+CPIN?")
    }

    fn parse(&self, _response: ByteSpan<'_>) -> AtResult<()> {
        Ok(())
    }
}

/// `AT+CCID`: integrated circuit card identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetIccid;

impl AtCommand for GetIccid {
    type Response = Vec<u8>;

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        buf.write_str("AT+CCID")
    }

    fn parse(&self, response: ByteSpan<'_>) -> AtResult<Vec<u8>> {
        Ok(response.trim().skip_prefix(b"+CCID: ").trim().to_vec())
    }
}

/// `AT+CIMI`: international mobile subscriber identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetImsi;

impl AtCommand for GetImsi {
    type Response = Vec<u8>;

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        buf.write_str("AT+CIMI")
    }

    fn parse(&self, response: ByteSpan<'_>) -> AtResult<Vec<u8>> {
        Ok(response.trim().to_vec())
    }
}
