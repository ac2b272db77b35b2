//! Fuzz target: AT response parsers
//!
//! Hands arbitrary information text to every query parser.  Garbage must
//! come back as an error, never a panic.
//!
//! cargo fuzz run fuzz_response_parsers

#![no_main]

use libfuzzer_sys::fuzz_target;
use rn4modem::at::AtCommand;
use rn4modem::at::information::{GetDeviceInfo, InfoField};
use rn4modem::at::network::{GetEpsRegistrationStatus, GetMnoProfile};
use rn4modem::at::sim::{GetIccid, GetImsi};
use rn4modem::ByteSpan;

fuzz_target!(|data: &[u8]| {
    let span = ByteSpan::new(data);

    if let Ok(reg) = GetEpsRegistrationStatus.parse(span) {
        let _ = reg.status.is_registered();
    }
    let _ = GetMnoProfile.parse(span);
    let _ = GetDeviceInfo(InfoField::Model).parse(span);

    if let Ok(iccid) = GetIccid.parse(span) {
        assert!(iccid.len() <= data.len());
    }
    if let Ok(imsi) = GetImsi.parse(span) {
        assert!(imsi.len() <= data.len());
    }
});
