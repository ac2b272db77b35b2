//! Power state machine against the simulated supply.

use rn4modem::{Error, PowerState};

use crate::mock_modem::Bench;

#[test]
fn already_on_module_is_not_power_cycled() {
    let bench = Bench::new();
    let calls = bench.supply.calls.clone();
    let mut modem = bench.build();

    modem.power_on().unwrap();
    assert!(calls.borrow().is_empty());
    assert_eq!(modem.power_state(), PowerState::On);
    assert_eq!(modem.at().count("AT"), 1);
}

#[test]
fn power_on_waits_for_boot() {
    let bench = Bench::powered_off(Some(3_000));
    let calls = bench.supply.calls.clone();
    let clock = bench.clock.clone();
    let mut modem = bench.build();

    modem.power_on().unwrap();
    assert_eq!(*calls.borrow(), vec![true]);
    assert_eq!(modem.power_state(), PowerState::On);
    // Each failed probe burns its 1 s timeout plus the 50 ms poll gap.
    let elapsed = rn4modem::Clock::now_ms(&clock);
    assert!((3_000..5_500).contains(&elapsed), "elapsed {elapsed}");
}

#[test]
fn power_on_times_out_when_module_never_answers() {
    let bench = Bench::powered_off(None);
    let clock = bench.clock.clone();
    let mut modem = bench.build();

    assert_eq!(modem.power_on(), Err(Error::PowerOnTimeout));
    assert_eq!(modem.power_state(), PowerState::Off);
    let elapsed = rn4modem::Clock::now_ms(&clock);
    assert!((10_000..12_500).contains(&elapsed), "elapsed {elapsed}");
}

#[test]
fn power_off_is_unconditional() {
    let bench = Bench::new();
    let calls = bench.supply.calls.clone();
    let mut modem = bench.build();

    modem.power_on().unwrap();
    modem.power_off();
    assert_eq!(*calls.borrow(), vec![false]);
    assert_eq!(modem.power_state(), PowerState::Off);
    assert!(!modem.is_powered_on());
}

#[test]
fn liveness_is_probed_every_time() {
    let mut modem = Bench::new().build();
    assert!(modem.is_powered_on());
    assert!(modem.is_powered_on());
    assert_eq!(modem.at().count("AT"), 2);
}
