//! Unsolicited result code (URC) subscribers.
//!
//! The engine surfaces every `+XXX: data` line it sees during a
//! transaction to a [`UrcHandler`].  The session owns one
//! [`EventSubscribers`] table: the built-in SIM subscriber (PIN status)
//! plus any application subscribers registered by event identifier.
//! At most one subscriber exists per identifier; registering again
//! replaces the previous one.

use log::info;

use crate::span::ByteSpan;

/// Receiver of unsolicited result codes.
pub trait UrcHandler {
    /// Offer one URC.  `urc` is the code (e.g. `+CPIN`), `data` the text
    /// after the colon.  Return `true` if the line was consumed.
    fn handle_urc(&mut self, urc: ByteSpan<'_>, data: ByteSpan<'_>) -> bool;
}

/// A handler that consumes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreUrcs;

impl UrcHandler for IgnoreUrcs {
    fn handle_urc(&mut self, _urc: ByteSpan<'_>, _data: ByteSpan<'_>) -> bool {
        false
    }
}

impl<F> UrcHandler for F
where
    F: FnMut(ByteSpan<'_>, ByteSpan<'_>) -> bool,
{
    fn handle_urc(&mut self, urc: ByteSpan<'_>, data: ByteSpan<'_>) -> bool {
        self(urc, data)
    }
}

// ───────────────────────────────────────────────────────────────
// SIM subscriber
// ───────────────────────────────────────────────────────────────

/// Callback receiving the PIN status text (e.g. `READY`, `SIM PIN`).
pub type PinHandler = Box<dyn FnMut(ByteSpan<'_>)>;

const CPIN: &[u8] = b"+CPIN";

/// Built-in subscriber for SIM card events.
#[derive(Default)]
pub struct SimEvents {
    pin_handler: Option<PinHandler>,
}

impl SimEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` (or clear with `None`), returning the one it
    /// replaces so a caller can restore it later.
    pub fn replace_pin_handler(&mut self, handler: Option<PinHandler>) -> Option<PinHandler> {
        core::mem::replace(&mut self.pin_handler, handler)
    }

    pub fn has_pin_handler(&self) -> bool {
        self.pin_handler.is_some()
    }

    fn handle_cpin(&mut self, urc: ByteSpan<'_>, data: ByteSpan<'_>) -> bool {
        if urc.as_bytes() != CPIN {
            return false;
        }
        match self.pin_handler.as_mut() {
            Some(handler) => handler(data),
            None => info!(
                "Received URC for PIN [{}]; install a PIN handler to receive this event",
                data
            ),
        }
        true
    }
}

impl UrcHandler for SimEvents {
    fn handle_urc(&mut self, urc: ByteSpan<'_>, data: ByteSpan<'_>) -> bool {
        self.handle_cpin(urc, data)
    }
}

// ───────────────────────────────────────────────────────────────
// Subscriber table
// ───────────────────────────────────────────────────────────────

/// Upper bound on application subscribers.
pub const MAX_SUBSCRIBERS: usize = 8;

/// Identifier under which the SIM subscriber is registered.
pub const SIM_EVENTS_ID: &str = "SIM";

/// Errors from [`EventSubscribers::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// The identifier belongs to a built-in subscriber.
    Reserved,
    /// All subscriber slots are in use.
    Full,
}

impl core::fmt::Display for RegisterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Reserved => write!(f, "event id reserved"),
            Self::Full => write!(f, "subscriber table full"),
        }
    }
}

struct Subscriber {
    id: &'static str,
    handler: Box<dyn UrcHandler>,
}

/// Dispatch table owned by the modem session.
#[derive(Default)]
pub struct EventSubscribers {
    sim: SimEvents,
    extra: heapless::Vec<Subscriber, MAX_SUBSCRIBERS>,
}

impl EventSubscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sim(&self) -> &SimEvents {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut SimEvents {
        &mut self.sim
    }

    /// Register `handler` under `id`, replacing any earlier subscriber
    /// with the same identifier.
    pub fn register(
        &mut self,
        id: &'static str,
        handler: Box<dyn UrcHandler>,
    ) -> Result<(), RegisterError> {
        if id == SIM_EVENTS_ID {
            return Err(RegisterError::Reserved);
        }
        if let Some(existing) = self.extra.iter_mut().find(|s| s.id == id) {
            existing.handler = handler;
            return Ok(());
        }
        self.extra
            .push(Subscriber { id, handler })
            .map_err(|_| RegisterError::Full)
    }

    /// Remove the subscriber registered under `id`.  Returns whether one
    /// was present.
    pub fn unregister(&mut self, id: &str) -> bool {
        match self.extra.iter().position(|s| s.id == id) {
            Some(idx) => {
                self.extra.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, id: &str) -> bool {
        id == SIM_EVENTS_ID || self.extra.iter().any(|s| s.id == id)
    }
}

impl UrcHandler for EventSubscribers {
    fn handle_urc(&mut self, urc: ByteSpan<'_>, data: ByteSpan<'_>) -> bool {
        if self.sim.handle_urc(urc, data) {
            return true;
        }
        self.extra
            .iter_mut()
            .any(|s| s.handler.handle_urc(urc, data))
    }
}
