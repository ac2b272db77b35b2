//! Power state machine.
//!
//! ```text
//!   Off ──power_on()──▶ PoweringOn ──[AT answers]──▶ On
//!    ▲                      │                         │
//!    └────[10 s timeout]────┘                         │
//!    └──────────────power_off()───────────────────────┘
//! ```
//!
//! Liveness is never cached: every [`is_powered_on`](Modem::is_powered_on)
//! sends a fresh `AT` probe.

use log::{debug, error, info};

use super::Modem;
use crate::app::ports::{AtPort, Clock, PowerControl, SerialPort};
use crate::error::{Error, Result};

/// Last observed power state of the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Off,
    PoweringOn,
    On,
}

impl<A, P, C, D, G> Modem<A, P, C, D, G>
where
    A: AtPort,
    P: PowerControl,
    C: Clock,
    D: SerialPort,
    G: SerialPort,
{
    /// Probe the module with a bare `AT`.
    pub fn is_powered_on(&mut self) -> bool {
        let timeout = self.config.liveness_timeout_ms;
        let alive = self.at.command("AT", timeout, &mut self.events).is_ok();
        if alive {
            self.power_state = PowerState::On;
        } else if self.power_state == PowerState::On {
            self.power_state = PowerState::Off;
        }
        alive
    }

    /// Power the module on and wait until it answers.
    pub fn power_on(&mut self) -> Result<()> {
        if self.is_powered_on() {
            debug!("Modem already powered on");
            return Ok(());
        }

        self.power_state = PowerState::PoweringOn;
        self.power.power_on();

        let deadline = self
            .clock
            .now_ms()
            .saturating_add(u64::from(self.config.power_on_timeout_ms));
        while !self.is_powered_on() {
            if self.clock.now_ms() > deadline {
                self.power_state = PowerState::Off;
                error!("Timed-out waiting for modem to power on");
                return Err(Error::PowerOnTimeout);
            }
            self.clock.delay_ms(self.config.power_on_poll_ms);
        }

        info!("Modem powered on");
        Ok(())
    }

    /// Cut power.  Does not wait for the module to shut down.
    pub fn power_off(&mut self) {
        self.power.power_off();
        self.power_state = PowerState::Off;
        info!("Modem powered off");
    }

    pub fn power_state(&self) -> PowerState {
        self.power_state
    }

    /// Busy-wait for the module to answer again after a silent reset.
    /// There is no upper bound: a module that never returns blocks here.
    pub(crate) fn await_power_after_reset(&mut self) {
        while !self.is_powered_on() {
            info!("..  - waiting for modem to power back on after reset");
            self.clock.delay_ms(self.config.reset_recovery_poll_ms);
        }
    }
}
