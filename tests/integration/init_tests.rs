//! Profile and network reconciliation.

use std::cell::RefCell;
use std::rc::Rc;

use rn4modem::at::network::{MnoProfile, OperatorFormat};
use rn4modem::{BehaviorFlags, CommandError, Error, RegionOverrides};

use crate::mock_modem::{Bench, Reply};

const RESET_PATH: [&str; 5] = ["AT+CFUN", "AT+UMNOPROF=", "AT+URAT", "AT+UBANDMASK", "AT+CGDCONT"];

fn bench_with_profile(code: u8) -> Bench {
    let mut bench = Bench::new();
    bench.at.on("AT+UMNOPROF?", Reply::ok(&format!("+UMNOPROF: {code}")));
    bench
}

#[test]
fn matching_profile_skips_reset_path() {
    let mut modem = bench_with_profile(5).build();
    modem
        .init_modem(&BehaviorFlags::default(), "apn", None, OperatorFormat::Numeric)
        .unwrap();

    let at = modem.at();
    for prefix in RESET_PATH {
        assert_eq!(at.count_prefix(prefix), 0, "{prefix} issued");
    }
    assert_eq!(at.init_calls, 1);
    assert_eq!(
        at.non_probe_commands(),
        vec![
            "AT+UMNOPROF?",
            "AT+CSCS=\"GSM\"",
            "AT+UGPIOC=23,10",
            "AT+UGPIOC=16,2",
            "AT+CREG=2",
            "AT+CGREG=2",
            "AT+CEREG=2",
            "AT+CPIN?",
            "AT+UDCONF=1,1",
        ]
    );
}

#[test]
fn mismatched_profile_is_rewritten_and_module_reset() {
    let mut modem = bench_with_profile(0).build();
    modem
        .init_modem(&BehaviorFlags::default(), "apn", None, OperatorFormat::Numeric)
        .unwrap();

    let at = modem.at();
    let cmds = at.non_probe_commands();
    assert_eq!(&cmds[..4], &["AT+UMNOPROF?", "AT+CFUN=0", "AT+UMNOPROF=5", "AT+CFUN=15"]);
    assert_eq!(at.init_calls, 2);
    assert!(at.count("AT") >= 1, "liveness polled after reset");
}

#[test]
fn default_profile_flag_expects_sw_default() {
    let mut modem = bench_with_profile(5).build();
    let flags = BehaviorFlags {
        force_default_profile: true,
        ..BehaviorFlags::default()
    };
    modem.init_modem(&flags, "apn", None, OperatorFormat::Numeric).unwrap();
    assert_eq!(modem.at().count("AT+UMNOPROF=0"), 1);
}

#[test]
fn berlin_override_forces_reset_with_bands_and_apn() {
    let mut modem = bench_with_profile(5).build();
    let flags = BehaviorFlags {
        region: RegionOverrides { berlin: true, us: false },
        ..BehaviorFlags::default()
    };
    modem.init_modem(&flags, "iot.berlin", None, OperatorFormat::Numeric).unwrap();

    let cmds = modem.at().non_probe_commands();
    assert_eq!(
        &cmds[..7],
        &[
            "AT+UMNOPROF?",
            "AT+CFUN=0",
            "AT+URAT=8",
            "AT+UBANDMASK=0,0",
            "AT+UBANDMASK=1,168761503",
            "AT+CGDCONT=1,\"IP\",\"iot.berlin\"",
            "AT+CFUN=15",
        ]
    );
    assert_eq!(modem.at().count_prefix("AT+UMNOPROF="), 0);
}

#[test]
fn us_override_sets_us_bands() {
    let mut modem = bench_with_profile(5).build();
    let flags = BehaviorFlags {
        region: RegionOverrides { berlin: false, us: true },
        ..BehaviorFlags::default()
    };
    modem.init_modem(&flags, "apn", None, OperatorFormat::Numeric).unwrap();
    assert_eq!(modem.at().count("AT+UBANDMASK=1,2074"), 1);
    assert_eq!(modem.at().count_prefix("AT+CGDCONT"), 0);
}

#[test]
fn operator_selection_deregisters_then_locks() {
    let mut modem = bench_with_profile(0).build();
    modem
        .init_modem(&BehaviorFlags::default(), "apn", Some("310260"), OperatorFormat::Numeric)
        .unwrap();

    let at = modem.at();
    assert_eq!(at.count("AT+COPS=2"), 2, "before query and after reset");
    assert_eq!(at.count("AT+COPS=1,2,\"310260\",9"), 1);
    let cmds = at.non_probe_commands();
    assert_eq!(cmds[0], "AT+COPS=2");
}

#[test]
fn terminal_init_failure_is_fatal() {
    let mut bench = Bench::new();
    bench.at.init_result = false;
    let mut modem = bench.build();
    assert_eq!(
        modem.init_modem(&BehaviorFlags::default(), "apn", None, OperatorFormat::Numeric),
        Err(Error::TerminalInit)
    );
    assert!(modem.at().commands.is_empty());
}

#[test]
fn profile_query_failure_is_fatal() {
    let mut bench = Bench::new();
    bench.at.on("AT+UMNOPROF?", Reply::timeout());
    let mut modem = bench.build();
    assert_eq!(
        modem.init_modem(&BehaviorFlags::default(), "apn", None, OperatorFormat::Numeric),
        Err(Error::ProfileQuery(CommandError::Timeout))
    );
}

#[test]
fn profile_write_failure_is_fatal() {
    let mut bench = bench_with_profile(2);
    bench.at.on("AT+UMNOPROF=5", Reply::error());
    let mut modem = bench.build();
    assert_eq!(
        modem.init_modem(&BehaviorFlags::default(), "apn", None, OperatorFormat::Numeric),
        Err(Error::ProfileUpdate {
            from: MnoProfile::Att,
            to: MnoProfile::Tmo
        })
    );
    assert_eq!(modem.at().count("AT+CFUN=15"), 0);
}

#[test]
fn operator_rejection_is_fatal() {
    let mut bench = bench_with_profile(5);
    bench.at.on("AT+COPS=1,0,\"Telekom\",9", Reply::error());
    let mut modem = bench.build();
    assert_eq!(
        modem.init_modem(
            &BehaviorFlags::default(),
            "apn",
            Some("Telekom"),
            OperatorFormat::LongAlphanumeric
        ),
        Err(Error::OperatorSelection(CommandError::Protocol))
    );
}

#[test]
fn cosmetic_failures_do_not_abort() {
    let mut bench = bench_with_profile(5);
    bench
        .at
        .on("AT+CSCS=\"GSM\"", Reply::error())
        .on("AT+UGPIOC=23,10", Reply::timeout())
        .on("AT+CEREG=2", Reply::error())
        .on("AT+CPIN?", Reply::error())
        .on("AT+UDCONF=1,1", Reply::error());
    let mut modem = bench.build();
    assert!(modem
        .init_modem(&BehaviorFlags::default(), "apn", None, OperatorFormat::Numeric)
        .is_ok());
}

#[test]
fn caller_pin_handler_survives_init() {
    for cpin in [Reply::ok("").with_urc("+CPIN", "SIM PIN"), Reply::error().with_urc("+CPIN", "READY")] {
        let mut bench = bench_with_profile(5);
        bench.at.on("AT+CPIN?", cpin);
        let mut modem = bench.build();

        let seen = Rc::new(RefCell::new(Vec::<String>::new()));
        let sink = Rc::clone(&seen);
        modem.set_handler_pin(move |status| sink.borrow_mut().push(status.to_string()));

        modem
            .init_modem(&BehaviorFlags::default(), "apn", None, OperatorFormat::Numeric)
            .unwrap();
        assert!(seen.borrow().is_empty(), "transient handler must take the init check");

        modem.at_mut().set("AT+CPIN?", Reply::ok("").with_urc("+CPIN", "READY"));
        modem.pin_status().unwrap();
        assert_eq!(seen.borrow().last().map(String::as_str), Some("READY"));
    }
}
