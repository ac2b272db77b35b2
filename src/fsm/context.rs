//! Shared mutable context threaded through every attach-state handler.
//!
//! The supervisor writes the latest clock sample and `+CEREG` status
//! before each tick; handlers read them and keep the reset bookkeeping.

use crate::at::network::RegistrationStatus;

pub struct AttachContext {
    /// Clock sample taken just before this tick.
    pub now_ms: u64,
    /// Latest registration status.  `None` when this tick's query failed;
    /// a failed query neither attaches nor marks a reset.
    pub status: Option<RegistrationStatus>,

    /// The module reported a state it will not leave without a reset.
    pub needs_reset: bool,
    /// A reset is only issued once `now_ms` passes this point.  Fixed for
    /// the whole wait: once it has passed, every stuck sample resets.
    pub reset_deadline_ms: u64,
    /// Absolute give-up time in bounded mode.
    pub give_up_at_ms: Option<u64>,

    /// Silent resets issued so far.
    pub resets: u32,
}

impl AttachContext {
    /// Context for a wait starting at `start_ms`.  `bound_ms` enables the
    /// bounded (test) mode.
    pub fn new(start_ms: u64, reset_after_ms: u64, bound_ms: Option<u64>) -> Self {
        Self {
            now_ms: start_ms,
            status: None,
            needs_reset: false,
            reset_deadline_ms: start_ms.saturating_add(reset_after_ms),
            give_up_at_ms: bound_ms.map(|b| start_ms.saturating_add(b)),
            resets: 0,
        }
    }

    /// Record one poll result.
    pub fn observe(&mut self, now_ms: u64, status: Option<RegistrationStatus>) {
        self.now_ms = now_ms;
        self.status = status;
    }

    pub fn is_registered(&self) -> bool {
        self.status.is_some_and(RegistrationStatus::is_registered)
    }

    pub fn past_give_up(&self) -> bool {
        self.give_up_at_ms.is_some_and(|t| self.now_ms > t)
    }

    pub fn reset_due(&self) -> bool {
        self.needs_reset && self.now_ms > self.reset_deadline_ms
    }
}
