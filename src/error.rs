//! Unified error types for the modem core.
//!
//! Two layers, one shape.  The transaction engine reports a
//! [`CommandError`] for every non-`OK` outcome; the lifecycle operations
//! wrap that into [`Error`] when a failure is fatal to the caller.
//! Cosmetic failures never reach this type: they are logged at the call
//! site and the operation carries on.  All variants are `Copy` so they can
//! be passed around the supervisor loops without allocation.

use core::fmt;

use crate::at::network::MnoProfile;

// ---------------------------------------------------------------------------
// Transaction outcome
// ---------------------------------------------------------------------------

/// Why a single AT transaction did not end in `OK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The module answered `ERROR` / `+CME ERROR`, or the response could
    /// not be parsed.
    Protocol,
    /// No final result code arrived before the caller's deadline.
    Timeout,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol => write!(f, "protocol error"),
            Self::Timeout => write!(f, "timed out"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Result of one AT transaction.
pub type AtResult<T> = core::result::Result<T, CommandError>;

// ---------------------------------------------------------------------------
// Lifecycle errors
// ---------------------------------------------------------------------------

/// Every fatal outcome of a lifecycle operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The engine could not bring the AT terminal into a known state.
    TerminalInit,
    /// The current operating profile could not be read.
    ProfileQuery(CommandError),
    /// Writing the expected operating profile failed.
    ProfileUpdate { from: MnoProfile, to: MnoProfile },
    /// Manual operator selection was rejected.
    OperatorSelection(CommandError),
    /// The module did not answer `AT` within the power-on window.
    PowerOnTimeout,
    /// Bounded registration mode gave up before the module attached.
    RegistrationTimeout,
    /// Host device registration failed on every attempt.
    HostIdentity { attempts: u8 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TerminalInit => write!(f, "terminal initialisation failed"),
            Self::ProfileQuery(e) => write!(f, "MNO profile query: {e}"),
            Self::ProfileUpdate { from, to } => {
                write!(f, "MNO profile update {} -> {} failed", from.code(), to.code())
            }
            Self::OperatorSelection(e) => write!(f, "operator selection: {e}"),
            Self::PowerOnTimeout => write!(f, "timed out waiting for modem power-on"),
            Self::RegistrationTimeout => write!(f, "network registration timed out"),
            Self::HostIdentity { attempts } => {
                write!(f, "host device registration failed after {attempts} attempts")
            }
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
