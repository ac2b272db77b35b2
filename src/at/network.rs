//! Network registration and radio configuration commands.

use core::fmt::Write;

use log::warn;
use serde::{Deserialize, Serialize};

use super::{AtCommand, CommandBuf};
use crate::error::{AtResult, CommandError};
use crate::span::ByteSpan;

// ---------------------------------------------------------------------------
// Operating (MNO) profile
// ---------------------------------------------------------------------------

/// Persistent carrier/band configuration bundle selected with `+UMNOPROF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MnoProfile {
    SwDefault,
    SimIccid,
    Att,
    Verizon,
    Telstra,
    Tmo,
    ChinaTelecom,
    Sprint,
    Vodafone,
    Standard,
    /// A code this crate has no name for.
    Other(u8),
}

impl MnoProfile {
    pub fn code(self) -> u8 {
        match self {
            Self::SwDefault => 0,
            Self::SimIccid => 1,
            Self::Att => 2,
            Self::Verizon => 3,
            Self::Telstra => 4,
            Self::Tmo => 5,
            Self::ChinaTelecom => 6,
            Self::Sprint => 8,
            Self::Vodafone => 19,
            Self::Standard => 100,
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::SwDefault,
            1 => Self::SimIccid,
            2 => Self::Att,
            3 => Self::Verizon,
            4 => Self::Telstra,
            5 => Self::Tmo,
            6 => Self::ChinaTelecom,
            8 => Self::Sprint,
            19 => Self::Vodafone,
            100 => Self::Standard,
            other => Self::Other(other),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SwDefault => "SW default",
            Self::SimIccid => "SIM ICCID select",
            Self::Att => "AT&T",
            Self::Verizon => "Verizon",
            Self::Telstra => "Telstra",
            Self::Tmo => "T-Mobile US",
            Self::ChinaTelecom => "China Telecom",
            Self::Sprint => "Sprint",
            Self::Vodafone => "Vodafone",
            Self::Standard => "Standard Europe",
            Self::Other(_) => "unknown",
        }
    }
}

/// `AT+UMNOPROF?`
#[derive(Debug, Clone, Copy, Default)]
pub struct GetMnoProfile;

impl AtCommand for GetMnoProfile {
    type Response = MnoProfile;

    fn timeout_ms(&self) -> u32 {
        15_000
    }

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        buf.write_str("AT+UMNOPROF?")
    }

    fn parse(&self, response: ByteSpan<'_>) -> AtResult<MnoProfile> {
        let value = response.trim().skip_prefix(b"+UMNOPROF: ");
        match value.fields(b',').next().and_then(ByteSpan::parse_int) {
            Some(code) if (0..=255).contains(&code) => Ok(MnoProfile::from_code(code as u8)),
            _ => {
                warn!("Unparseable MNO profile response {:?}", response);
                Err(CommandError::Protocol)
            }
        }
    }
}

/// `AT+UMNOPROF=<profile>`: takes effect after the next reset.
#[derive(Debug, Clone, Copy)]
pub struct SetMnoProfile(pub MnoProfile);

impl AtCommand for SetMnoProfile {
    type Response = ();

    fn timeout_ms(&self) -> u32 {
        180_000
    }

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        write!(buf, "AT+UMNOPROF={}", self.0.code())
    }

    fn parse(&self, _response: ByteSpan<'_>) -> AtResult<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Functionality
// ---------------------------------------------------------------------------

/// `+CFUN` levels used by the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Functionality {
    /// RF off, SIM powered; the "soft-off" used before profile changes.
    Minimum = 0,
    Full = 1,
    AirplaneMode = 4,
    /// Restart the network stack, keep SIM state.
    SilentReset = 15,
    /// Restart the network stack and reset the SIM.
    SilentResetWithSim = 16,
}

/// `AT+CFUN=<fun>`
#[derive(Debug, Clone, Copy)]
pub struct SetFunctionality(pub Functionality);

impl AtCommand for SetFunctionality {
    type Response = ();

    fn timeout_ms(&self) -> u32 {
        180_000
    }

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        write!(buf, "AT+CFUN={}", self.0 as u8)
    }

    fn parse(&self, _response: ByteSpan<'_>) -> AtResult<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Operator selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OperatorMode {
    Automatic = 0,
    Manual = 1,
    Deregister = 2,
    SetFormat = 3,
    ManualThenAutomatic = 4,
}

/// How the operator in `+COPS` is spelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum OperatorFormat {
    LongAlphanumeric = 0,
    ShortAlphanumeric = 1,
    #[default]
    Numeric = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AccessTechnology {
    Lte = 7,
    EcGsmIot = 8,
    LteNbS1 = 9,
}

/// `AT+COPS=<mode>[,<format>[,"<oper>"[,<AcT>]]]`
#[derive(Debug, Clone, Copy)]
pub struct SetOperatorSelection<'a> {
    pub mode: OperatorMode,
    pub format: Option<OperatorFormat>,
    pub operator: Option<&'a str>,
    pub access_technology: Option<AccessTechnology>,
}

impl<'a> SetOperatorSelection<'a> {
    /// Detach from the network.
    pub const fn deregister() -> Self {
        Self {
            mode: OperatorMode::Deregister,
            format: None,
            operator: None,
            access_technology: None,
        }
    }

    /// Lock onto `operator` on the given access technology.
    pub const fn manual(
        operator: &'a str,
        format: OperatorFormat,
        access_technology: AccessTechnology,
    ) -> Self {
        Self {
            mode: OperatorMode::Manual,
            format: Some(format),
            operator: Some(operator),
            access_technology: Some(access_technology),
        }
    }
}

impl AtCommand for SetOperatorSelection<'_> {
    type Response = ();

    fn timeout_ms(&self) -> u32 {
        180_000
    }

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        write!(buf, "AT+COPS={}", self.mode as u8)?;
        let Some(format) = self.format else {
            return Ok(());
        };
        write!(buf, ",{}", format as u8)?;
        let Some(operator) = self.operator else {
            return Ok(());
        };
        write!(buf, ",\"{}\"", operator)?;
        if let Some(act) = self.access_technology {
            write!(buf, ",{}", act as u8)?;
        }
        Ok(())
    }

    fn parse(&self, _response: ByteSpan<'_>) -> AtResult<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EPS registration status
// ---------------------------------------------------------------------------

/// `<stat>` of `+CEREG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    NotRegistered,
    RegisteredHome,
    Searching,
    Denied,
    Unknown,
    RegisteredRoaming,
    Other(u8),
}

impl RegistrationStatus {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::NotRegistered,
            1 => Self::RegisteredHome,
            2 => Self::Searching,
            3 => Self::Denied,
            4 => Self::Unknown,
            5 => Self::RegisteredRoaming,
            other => Self::Other(other),
        }
    }

    /// Attached, at home or roaming.
    pub fn is_registered(self) -> bool {
        matches!(self, Self::RegisteredHome | Self::RegisteredRoaming)
    }

    /// A state the module will not leave on its own.
    pub fn is_stuck(self) -> bool {
        matches!(self, Self::NotRegistered | Self::Denied)
    }
}

/// Parsed `+CEREG: <n>,<stat>[,...]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpsRegistration {
    /// URC reporting mode currently configured.
    pub mode: u8,
    pub status: RegistrationStatus,
}

/// `AT+CEREG?`
#[derive(Debug, Clone, Copy, Default)]
pub struct GetEpsRegistrationStatus;

impl AtCommand for GetEpsRegistrationStatus {
    type Response = EpsRegistration;

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        buf.write_str("AT+CEREG?")
    }

    fn parse(&self, response: ByteSpan<'_>) -> AtResult<EpsRegistration> {
        let mut fields = response.trim().skip_prefix(b"+CEREG: ").fields(b',');
        let mode = fields.next().and_then(ByteSpan::parse_int);
        let stat = fields.next().and_then(ByteSpan::parse_int);
        match (mode, stat) {
            (Some(mode), Some(stat)) if (0..=255).contains(&mode) && (0..=255).contains(&stat) => {
                Ok(EpsRegistration {
                    mode: mode as u8,
                    status: RegistrationStatus::from_code(stat as u8),
                })
            }
            _ => {
                warn!("Unparseable +CEREG response {:?}", response);
                Err(CommandError::Protocol)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Radio access technology, bands and PDP context
// ---------------------------------------------------------------------------

/// `+URAT` / `+UBANDMASK` radio access technology selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RadioTechnology {
    LteCatM1 = 7,
    NbIot = 8,
}

/// `AT+URAT=<rat>`
#[derive(Debug, Clone, Copy)]
pub struct SetRadioTechnology(pub RadioTechnology);

impl AtCommand for SetRadioTechnology {
    type Response = ();

    fn timeout_ms(&self) -> u32 {
        5_000
    }

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        write!(buf, "AT+URAT={}", self.0 as u8)
    }

    fn parse(&self, _response: ByteSpan<'_>) -> AtResult<()> {
        Ok(())
    }
}

/// `AT+UBANDMASK=<rat index>,<mask>`.  Bit 0 of `mask` is band 1.
/// Index 0 addresses Cat-M1, index 1 NB-IoT.
#[derive(Debug, Clone, Copy)]
pub struct SetBandMask {
    pub rat_index: u8,
    pub mask: u64,
}

impl AtCommand for SetBandMask {
    type Response = ();

    fn timeout_ms(&self) -> u32 {
        5_000
    }

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        write!(buf, "AT+UBANDMASK={},{}", self.rat_index, self.mask)
    }

    fn parse(&self, _response: ByteSpan<'_>) -> AtResult<()> {
        Ok(())
    }
}

/// `AT+CGDCONT=<cid>,"IP","<apn>"`
#[derive(Debug, Clone, Copy)]
pub struct SetPdpContext<'a> {
    pub cid: u8,
    pub apn: &'a str,
}

impl AtCommand for SetPdpContext<'_> {
    type Response = ();

    fn timeout_ms(&self) -> u32 {
        5_000
    }

    fn write(&self, buf: &mut CommandBuf) -> core::fmt::Result {
        write!(buf, "AT+CGDCONT={},\"IP\",\"{}\"", self.cid, self.apn)
    }

    fn parse(&self, _response: ByteSpan<'_>) -> AtResult<()> {
        Ok(())
    }
}
