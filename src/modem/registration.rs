//! Network registration supervisor.
//!
//! Polls `+CEREG` and feeds each sample to the attach [`Fsm`]; performs
//! the silent reset the machine asks for when the module is stuck in a
//! denied or not-registered state.  In production mode the wait has no
//! upper bound.

use log::{info, warn};

use super::Modem;
use crate::app::ports::{AtPort, Clock, PowerControl, SerialPort};
use crate::at::network::{Functionality, GetEpsRegistrationStatus, SetFunctionality};
use crate::config::BehaviorFlags;
use crate::error::{Error, Result};
use crate::fsm::context::AttachContext;
use crate::fsm::{Fsm, StateId};

impl<A, P, C, D, G> Modem<A, P, C, D, G>
where
    A: AtPort,
    P: PowerControl,
    C: Clock,
    D: SerialPort,
    G: SerialPort,
{
    /// Block until the module is attached (home or roaming), then
    /// register the host identity unless `flags.skip_host_identity`.
    ///
    /// With `flags.bounded_registration` the wait gives up after
    /// `bounded_registration_ms` with [`Error::RegistrationTimeout`].
    pub fn wait_for_network_registration(
        &mut self,
        purpose: Option<&str>,
        flags: &BehaviorFlags,
    ) -> Result<()> {
        let bound = flags
            .bounded_registration
            .then_some(u64::from(self.config.bounded_registration_ms));
        let mut ctx = AttachContext::new(
            self.clock.now_ms(),
            u64::from(self.config.registration_reset_after_ms),
            bound,
        );
        let mut fsm = Fsm::attach();
        fsm.start(&mut ctx);

        loop {
            let status = self.send(&GetEpsRegistrationStatus).ok().map(|r| r.status);
            ctx.observe(self.clock.now_ms(), status);

            match fsm.tick(&mut ctx) {
                StateId::Attached => break,
                StateId::TimedOut => return Err(Error::RegistrationTimeout),
                StateId::ResettingModem => {
                    self.send_logged(&SetFunctionality(Functionality::SilentReset), "resetting modem");
                    self.await_power_after_reset();
                    ctx.now_ms = self.clock.now_ms();
                    fsm.tick(&mut ctx);
                }
                StateId::PollingForAttach => {}
            }

            info!(".. waiting for network registration");
            self.clock.delay_ms(self.config.registration_poll_ms);
        }

        if flags.skip_host_identity {
            return Ok(());
        }
        if let Err(e) = self.set_host_device_information(purpose) {
            warn!("Error setting host device information ({e}); registration itself succeeded");
        }
        Ok(())
    }
}
