//! Profile and network reconciliation (`init_modem`).
//!
//! Brings the module's persistent operator profile, region band plan and
//! operator selection in line with what the caller wants, then applies
//! the baseline configuration every session relies on.  Profile and band
//! changes only take effect after a reset, so they are batched behind a
//! single `AT+CFUN=0` ... `AT+CFUN=15` bracket.

use log::{debug, error, info, warn};

use super::Modem;
use crate::app::ports::{AtPort, Clock, PowerControl, SerialPort};
use crate::at::network::{
    AccessTechnology, Functionality, GetMnoProfile, MnoProfile, OperatorFormat, RadioTechnology, SetBandMask,
    SetFunctionality, SetMnoProfile, SetOperatorSelection, SetPdpContext, SetRadioTechnology,
};
use crate::at::sim::GetPinStatus;
use crate::at::Raw;
use crate::config::BehaviorFlags;
use crate::error::{Error, Result};
use crate::span::ByteSpan;

/// NB-IoT bands used by the Berlin test network.
const BERLIN_NB1_BANDS: u64 = 168_761_503;
/// NB-IoT bands 2, 4, 5 and 12.
const US_NB1_BANDS: u64 = 2_074;

const CPIN_CHECK_TIMEOUT_MS: u32 = 5_000;

impl<A, P, C, D, G> Modem<A, P, C, D, G>
where
    A: AtPort,
    P: PowerControl,
    C: Clock,
    D: SerialPort,
    G: SerialPort,
{
    /// Reconcile profile, bands and operator, then apply the baseline
    /// configuration.  `operator` enables manual operator selection in
    /// `format`; `apn` is only used by the Berlin override.
    pub fn init_modem(
        &mut self,
        flags: &BehaviorFlags,
        apn: &str,
        operator: Option<&str>,
        format: OperatorFormat,
    ) -> Result<()> {
        if !self.at.init_terminal() {
            error!("Failed to initialise the AT terminal");
            return Err(Error::TerminalInit);
        }

        if operator.is_some() {
            self.deregister();
        }

        let current = self.send(&GetMnoProfile).map_err(|e| {
            error!("Error retrieving current MNO Profile: {e}");
            Error::ProfileQuery(e)
        })?;
        let expected = flags.expected_profile();

        if current != expected || flags.region.any() {
            self.reconfigure_and_reset(flags, apn, current, expected)?;
            if operator.is_some() {
                self.deregister();
            }
        }

        if let Some(operator) = operator {
            info!("Selecting network operator \"{operator}\", it can take a while");
            let selection = SetOperatorSelection::manual(operator, format, AccessTechnology::LteNbS1);
            self.send(&selection).map_err(|e| {
                error!("Error selecting mobile operator: {e}");
                Error::OperatorSelection(e)
            })?;
        }

        self.apply_baseline();
        self.check_pin_ready();

        self.send_logged(
            &Raw::new("AT+UDCONF=1,1", 1_000),
            "setting HEX mode for socket send/receive",
        );

        debug!("Modem correctly initialized");
        Ok(())
    }

    /// Steps that need the module in minimum functionality, followed by
    /// the silent reset that applies them.
    fn reconfigure_and_reset(
        &mut self,
        flags: &BehaviorFlags,
        apn: &str,
        current: MnoProfile,
        expected: MnoProfile,
    ) -> Result<()> {
        self.send_logged(&SetFunctionality(Functionality::Minimum), "turning modem off");

        if current != expected {
            warn!(
                "Updating MNO Profile to {} - {}",
                expected.code(),
                expected.label()
            );
            if let Err(e) = self.send(&SetMnoProfile(expected)) {
                error!(
                    "Error re-setting MNO Profile from {} to {}: {e}",
                    current.code(),
                    expected.code()
                );
                return Err(Error::ProfileUpdate {
                    from: current,
                    to: expected,
                });
            }
        }

        if flags.region.berlin {
            self.apply_nb1_bands(BERLIN_NB1_BANDS);
            self.send_logged(&SetPdpContext { cid: 1, apn }, "setting custom APN");
        }
        if flags.region.us {
            self.apply_nb1_bands(US_NB1_BANDS);
        }

        self.send_logged(&SetFunctionality(Functionality::SilentReset), "resetting modem");
        self.await_power_after_reset();

        if !self.at.init_terminal() {
            error!("Failed to re-initialise the AT terminal after reset");
            return Err(Error::TerminalInit);
        }
        Ok(())
    }

    /// NB-IoT only, Cat-M1 bands cleared, NB-IoT bands set to `nb1_mask`.
    fn apply_nb1_bands(&mut self, nb1_mask: u64) {
        self.send_logged(&SetRadioTechnology(RadioTechnology::NbIot), "setting RAT to NB1");
        self.send_logged(
            &SetBandMask { rat_index: 0, mask: 0 },
            "clearing the Cat-M1 band mask",
        );
        self.send_logged(
            &SetBandMask { rat_index: 1, mask: nb1_mask },
            "setting the NB1 band mask",
        );
    }

    fn deregister(&mut self) {
        if let Err(e) = self.send(&SetOperatorSelection::deregister()) {
            warn!("Potential error deregistering from network: {e}");
        }
    }

    fn apply_baseline(&mut self) {
        self.send_logged(&Raw::new("AT+CSCS=\"GSM\"", 1_000), "setting character set to GSM");
        // Status LEDs: pin 23 module operating status, pin 16 network status.
        self.send_logged(&Raw::new("AT+UGPIOC=23,10", 5_000), "mapping pin 23 to operating status");
        self.send_logged(&Raw::new("AT+UGPIOC=16,2", 5_000), "mapping pin 16 to network status");
        self.send_logged(&Raw::new("AT+CREG=2", 1_000), "enabling +CREG URCs");
        self.send_logged(&Raw::new("AT+CGREG=2", 1_000), "enabling +CGREG URCs");
        self.send_logged(&Raw::new("AT+CEREG=2", 1_000), "enabling +CEREG URCs");
    }

    /// One-off PIN check with a transient handler.  The caller's handler
    /// is restored whatever the outcome.
    fn check_pin_ready(&mut self) {
        let saved = self
            .events
            .sim_mut()
            .replace_pin_handler(Some(Box::new(warn_unless_ready)));
        let outcome = self.send(&GetPinStatus { timeout_ms: CPIN_CHECK_TIMEOUT_MS });
        self.events.sim_mut().replace_pin_handler(saved);
        if let Err(e) = outcome {
            warn!("Error checking PIN status: {e}");
        }
    }
}

fn warn_unless_ready(status: ByteSpan<'_>) {
    if !status.trim().starts_with(b"READY") {
        error!(
            "PIN status [{status}] != READY and PIN handler not set. \
             Disable the SIM card PIN, or set a handler."
        );
    }
}
