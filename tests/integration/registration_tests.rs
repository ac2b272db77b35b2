//! Registration supervisor: attach, forced reset and bounded mode.

use rn4modem::{BehaviorFlags, Clock, Error, HostDeviceProfile};
use rn4modem::modem::HostIdentity;

use crate::mock_modem::{Bench, Reply};

const CEREG: &str = "AT+CEREG?";

fn quiet_flags() -> BehaviorFlags {
    BehaviorFlags {
        skip_host_identity: true,
        ..BehaviorFlags::default()
    }
}

#[test]
fn attaches_on_home_network() {
    let mut bench = Bench::new();
    bench.at.on(CEREG, Reply::ok("+CEREG: 2,2")).on(CEREG, Reply::ok("+CEREG: 2,1"));
    let mut modem = bench.build();

    modem.wait_for_network_registration(None, &quiet_flags()).unwrap();
    assert_eq!(modem.at().count(CEREG), 2);
    assert_eq!(modem.at().count("AT+CFUN=15"), 0);
}

#[test]
fn roaming_counts_as_attached() {
    let mut bench = Bench::new();
    bench.at.on(CEREG, Reply::ok("+CEREG: 0,5"));
    let mut modem = bench.build();
    modem.wait_for_network_registration(None, &quiet_flags()).unwrap();
    assert_eq!(modem.at().count(CEREG), 1);
}

#[test]
fn bounded_mode_gives_up_after_deadline() {
    let mut bench = Bench::new();
    bench.at.on(CEREG, Reply::ok("+CEREG: 2,2"));
    let clock = bench.clock.clone();
    let mut modem = bench.build();

    let flags = BehaviorFlags {
        bounded_registration: true,
        ..quiet_flags()
    };
    assert_eq!(
        modem.wait_for_network_registration(None, &flags),
        Err(Error::RegistrationTimeout)
    );
    let elapsed = clock.now_ms();
    assert!((30_000..=34_000).contains(&elapsed), "elapsed {elapsed}");
}

#[test]
fn denied_registration_triggers_one_silent_reset() {
    let mut bench = Bench::new();
    // Polls every 2 s from t=0; the first one after t=30 s resets.
    for _ in 0..17 {
        bench.at.on(CEREG, Reply::ok("+CEREG: 2,3"));
    }
    bench.at.on(CEREG, Reply::ok("+CEREG: 2,1"));
    let mut modem = bench.build();

    modem.wait_for_network_registration(None, &quiet_flags()).unwrap();
    assert_eq!(modem.at().count("AT+CFUN=15"), 1);
    assert_eq!(modem.at().count(CEREG), 18);
}

#[test]
fn still_denied_after_deadline_resets_on_every_poll() {
    let mut bench = Bench::new();
    // Polls at t=0..30 s stay quiet; the four denied polls after that
    // each reset, since the deadline is not moved by a reset.
    for _ in 0..20 {
        bench.at.on(CEREG, Reply::ok("+CEREG: 2,3"));
    }
    bench.at.on(CEREG, Reply::ok("+CEREG: 2,1"));
    let mut modem = bench.build();

    modem.wait_for_network_registration(None, &quiet_flags()).unwrap();
    assert_eq!(modem.at().count(CEREG), 21);
    assert_eq!(modem.at().count("AT+CFUN=15"), 4);
}

#[test]
fn failed_poll_after_reset_does_not_reset_again() {
    let mut bench = Bench::new();
    for _ in 0..17 {
        bench.at.on(CEREG, Reply::ok("+CEREG: 2,3"));
    }
    bench.at.on(CEREG, Reply::timeout());
    bench.at.on(CEREG, Reply::error());
    bench.at.on(CEREG, Reply::ok("+CEREG: 2,1"));
    let mut modem = bench.build();

    modem.wait_for_network_registration(None, &quiet_flags()).unwrap();
    assert_eq!(modem.at().count("AT+CFUN=15"), 1);
    assert_eq!(modem.at().count(CEREG), 20);
}

#[test]
fn searching_never_resets() {
    let mut bench = Bench::new();
    for _ in 0..40 {
        bench.at.on(CEREG, Reply::ok("+CEREG: 2,2"));
    }
    bench.at.on(CEREG, Reply::ok("+CEREG: 2,1"));
    let mut modem = bench.build();

    modem.wait_for_network_registration(None, &quiet_flags()).unwrap();
    assert_eq!(modem.at().count("AT+CFUN=15"), 0);
}

#[test]
fn failed_status_query_is_not_fatal() {
    let mut bench = Bench::new();
    bench
        .at
        .on(CEREG, Reply::timeout())
        .on(CEREG, Reply::error())
        .on(CEREG, Reply::ok("+CEREG: 2,1"));
    let mut modem = bench.build();
    modem.wait_for_network_registration(None, &quiet_flags()).unwrap();
    assert_eq!(modem.at().count(CEREG), 3);
}

#[test]
fn host_identity_is_registered_after_attach() {
    let mut bench = Bench::new();
    bench
        .at
        .on(CEREG, Reply::ok("+CEREG: 2,1"))
        .on("AT+CGMI", Reply::ok("u-blox"))
        .on("AT+CGMM", Reply::ok("SARA-N410-02B"))
        .on("AT+CGMR", Reply::ok("L0.0.00.00.07.04"));
    let mut modem = bench.build();

    modem
        .wait_for_network_registration(Some("tracker"), &BehaviorFlags::default())
        .unwrap();

    let expected = HostIdentity::compose(
        &HostDeviceProfile::default(),
        "tracker",
        b"u-blox",
        b"SARA-N410-02B",
        b"L0.0.00.00.07.04",
    );
    assert_eq!(modem.at().count(&format!("AT+UHOSTDEV={}", expected.long())), 1);
}

#[test]
fn identity_failure_does_not_fail_registration() {
    let mut bench = Bench::new();
    bench.at.on(CEREG, Reply::ok("+CEREG: 2,1"));
    let descriptor = HostIdentity::compose(&HostDeviceProfile::default(), "devkit", b"", b"", b"");
    bench
        .at
        .on(&format!("AT+UHOSTDEV={}", descriptor.long()), Reply::error());
    let mut modem = bench.build();

    assert!(modem
        .wait_for_network_registration(None, &BehaviorFlags::default())
        .is_ok());
    assert_eq!(modem.at().count_prefix("AT+UHOSTDEV="), 10);
}
