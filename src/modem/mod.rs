//! The modem session: lifecycle orchestration over the port traits.
//!
//! [`Modem`] owns the transaction engine, the power primitive, the clock
//! and the optional debug and GNSS channels, together with the state that
//! outlives a single call (URC subscribers, the host identity cache, the
//! last observed power state).  The lifecycle operations live in the
//! submodules, each adding an `impl` block:
//!
//! | Module         | Operations                                              |
//! |----------------|---------------------------------------------------------|
//! | `power`        | `power_on`, `power_off`, `is_powered_on`                |
//! | `init`         | `init_modem`                                            |
//! | `registration` | `wait_for_network_registration`                         |
//! | `identity`     | `compute_/set_/host_device_information`                 |
//! | `bypass`       | `bypass`, `bypass_gnss`, `bypass_cli`, `bypass_gnss_cli` |
//! | `gnss`         | `drain_gnss_rx`, [`GnssBuffer`]                         |
//!
//! The debug and GNSS channels are fixed at construction with
//! [`Modem::with_debug_port`] / [`Modem::with_gnss_port`]; a session
//! built without them uses [`NullPort`] and the operations that need them
//! return without doing anything.

mod bypass;
mod gnss;
mod identity;
mod init;
mod power;
mod registration;

pub use bypass::{TokenMatcher, EXIT_BYPASS_TOKEN};
pub use gnss::GnssBuffer;
pub use identity::{HostIdentity, IDENTITY_MAX, METADATA_FIELD_MAX};
pub use power::PowerState;

use log::warn;

use crate::app::ports::{AtPort, Clock, NullPort, PowerControl, SerialPort};
use crate::at::sim::{GetIccid, GetImsi, GetPinStatus};
use crate::at::{self, AtCommand};
use crate::config::ModemConfig;
use crate::error::{AtResult, CommandError};
use crate::span::ByteSpan;
use crate::urc::{EventSubscribers, RegisterError, UrcHandler};

/// `AT+CPIN?` timeout for an explicit status query.
const PIN_STATUS_TIMEOUT_MS: u32 = 10_000;

/// A SARA-R4/N4 session.
///
/// `A` is the transaction engine, `P` the power primitive, `C` the clock,
/// `D` and `G` the debug and GNSS channels.
pub struct Modem<A, P, C, D = NullPort, G = NullPort> {
    at: A,
    power: P,
    clock: C,
    debug: Option<D>,
    gnss: Option<G>,
    events: EventSubscribers,
    identity: Option<HostIdentity>,
    power_state: PowerState,
    config: ModemConfig,
    in_bypass: bool,
}

impl<A, P, C> Modem<A, P, C>
where
    A: AtPort,
    P: PowerControl,
    C: Clock,
{
    /// A session with only the modem channel.
    pub fn new(at: A, power: P, clock: C, config: ModemConfig) -> Self {
        Self {
            at,
            power,
            clock,
            debug: None,
            gnss: None,
            events: EventSubscribers::new(),
            identity: None,
            power_state: PowerState::Off,
            config,
            in_bypass: false,
        }
    }
}

impl<A, P, C, G> Modem<A, P, C, NullPort, G> {
    /// Attach the debug console channel.
    pub fn with_debug_port<D: SerialPort>(self, debug: D) -> Modem<A, P, C, D, G> {
        Modem {
            at: self.at,
            power: self.power,
            clock: self.clock,
            debug: Some(debug),
            gnss: self.gnss,
            events: self.events,
            identity: self.identity,
            power_state: self.power_state,
            config: self.config,
            in_bypass: self.in_bypass,
        }
    }
}

impl<A, P, C, D> Modem<A, P, C, D, NullPort> {
    /// Attach the GNSS receiver channel.
    pub fn with_gnss_port<G: SerialPort>(self, gnss: G) -> Modem<A, P, C, D, G> {
        Modem {
            at: self.at,
            power: self.power,
            clock: self.clock,
            debug: self.debug,
            gnss: Some(gnss),
            events: self.events,
            identity: self.identity,
            power_state: self.power_state,
            config: self.config,
            in_bypass: self.in_bypass,
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
    /// Run one typed command through the engine, dispatching any URCs
    /// seen meanwhile to the session's subscribers.
    pub fn send<Cmd: AtCommand + ?Sized>(&mut self, cmd: &Cmd) -> AtResult<Cmd::Response> {
        let Some(line) = at::render(cmd) else {
            warn!("Command does not fit in {} bytes", at::MAX_COMMAND_LEN);
            return Err(CommandError::Protocol);
        };
        let response = self.at.command(&line, cmd.timeout_ms(), &mut self.events)?;
        cmd.parse(response)
    }

    /// Like [`send`](Self::send), but a failure is only logged.
    /// Returns whether the command succeeded.
    pub(crate) fn send_logged<Cmd: AtCommand<Response = ()> + ?Sized>(
        &mut self,
        cmd: &Cmd,
        what: &str,
    ) -> bool {
        match self.send(cmd) {
            Ok(()) => true,
            Err(e) => {
                warn!("Potential error {what}: {e}");
                false
            }
        }
    }

    // ── URC subscribers ─────────────────────────────────────────

    /// Install the callback receiving SIM PIN status events, replacing
    /// any previous one.
    pub fn set_handler_pin<F>(&mut self, handler: F)
    where
        F: FnMut(ByteSpan<'_>) + 'static,
    {
        self.events.sim_mut().replace_pin_handler(Some(Box::new(handler)));
    }

    pub fn clear_handler_pin(&mut self) {
        self.events.sim_mut().replace_pin_handler(None);
    }

    /// Register an application URC subscriber under `id`.  A second
    /// registration with the same id replaces the first.
    pub fn register_event_handler<H>(&mut self, id: &'static str, handler: H) -> Result<(), RegisterError>
    where
        H: UrcHandler + 'static,
    {
        self.events.register(id, Box::new(handler))
    }

    pub fn unregister_event_handler(&mut self, id: &str) -> bool {
        self.events.unregister(id)
    }

    // ── SIM ─────────────────────────────────────────────────────

    /// Query the PIN status.  The answer is delivered to the PIN handler.
    pub fn pin_status(&mut self) -> AtResult<()> {
        self.send(&GetPinStatus { timeout_ms: PIN_STATUS_TIMEOUT_MS })
    }

    pub fn iccid(&mut self) -> AtResult<Vec<u8>> {
        self.send(&GetIccid)
    }

    pub fn imsi(&mut self) -> AtResult<Vec<u8>> {
        self.send(&GetImsi)
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    pub fn at(&self) -> &A {
        &self.at
    }

    pub fn at_mut(&mut self) -> &mut A {
        &mut self.at
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn power_control(&self) -> &P {
        &self.power
    }

    pub fn debug_port(&mut self) -> Option<&mut D> {
        self.debug.as_mut()
    }

    pub fn gnss_port(&mut self) -> Option<&mut G> {
        self.gnss.as_mut()
    }

    /// Tear the session down and hand back its parts.
    pub fn into_parts(self) -> (A, P, C, Option<D>, Option<G>) {
        (self.at, self.power, self.clock, self.debug, self.gnss)
    }
}
