//! Module power control through a GPIO line.
//!
//! SARA boards drive the module's enable (or PWR_ON through a transistor)
//! from one GPIO.  The active level is board-specific.

use embedded_hal::digital::OutputPin;
use log::{debug, error};

use crate::app::ports::PowerControl;

/// Electrical level that powers the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// [`PowerControl`] over any `embedded-hal` output pin.
pub struct GpioPowerControl<P> {
    pin: P,
    active: ActiveLevel,
}

impl<P: OutputPin> GpioPowerControl<P> {
    pub fn new(pin: P, active: ActiveLevel) -> Self {
        Self { pin, active }
    }

    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, on: bool) {
        let high = on == (self.active == ActiveLevel::High);
        let result = if high { self.pin.set_high() } else { self.pin.set_low() };
        match result {
            Ok(()) => debug!("Modem power pin driven {}", if high { "high" } else { "low" }),
            Err(e) => error!("Failed to drive modem power pin: {e:?}"),
        }
    }
}

impl<P: OutputPin> PowerControl for GpioPowerControl<P> {
    fn power_on(&mut self) {
        self.drive(true);
    }

    fn power_off(&mut self) {
        self.drive(false);
    }
}
