//! Reference firmware: bring a SARA-R4/N4 module online and relay its
//! channels to the debug console.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  UART1 ─▶ SerialAtEngine    GPIO10 ─▶ GpioPowerControl       │
//! │  UART0 ─▶ debug console     UART2  ─▶ GNSS receiver          │
//! │  esp_timer / FreeRTOS ─▶ SystemClock                         │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  Modem: power · init · registration · identity · bypass │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use rn4modem::adapters::at_engine::SerialAtEngine;
use rn4modem::adapters::power_pin::{ActiveLevel, GpioPowerControl};
use rn4modem::adapters::time::SystemClock;
use rn4modem::at::network::OperatorFormat;
use rn4modem::{BehaviorFlags, GnssBuffer, Modem, ModemConfig};

const BAUD_RATE: u32 = 115_200;
const APN: &str = "iot.example";
const GNSS_BUFFER_SIZE: usize = 2_048;
const MAIN_LOOP_DELAY_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("rn4modem v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;
    let uart_config = UartConfig::default().baudrate(Hertz(BAUD_RATE));

    let modem_uart = UartDriver::new(
        peripherals.uart1,
        pins.gpio17,
        pins.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let debug_uart = UartDriver::new(
        peripherals.uart0,
        pins.gpio43,
        pins.gpio44,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let gnss_uart = UartDriver::new(
        peripherals.uart2,
        pins.gpio4,
        pins.gpio5,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let power = GpioPowerControl::new(PinDriver::output(pins.gpio10)?, ActiveLevel::High);

    // ── 3. Session ────────────────────────────────────────────
    let config = ModemConfig::default();
    config.validate()?;
    let engine = SerialAtEngine::new(modem_uart, SystemClock::new());
    let mut modem = Modem::new(engine, power, SystemClock::new(), config)
        .with_debug_port(debug_uart)
        .with_gnss_port(gnss_uart);
    modem.set_handler_pin(|status| info!("SIM PIN status: {status}"));

    // ── 4. Lifecycle ──────────────────────────────────────────
    let flags = BehaviorFlags::default();
    modem.power_on()?;
    modem.init_modem(&flags, APN, None, OperatorFormat::Numeric)?;
    modem.wait_for_network_registration(None, &flags)?;
    info!("Host identity: {}", modem.host_device_information());
    match modem.iccid() {
        Ok(iccid) => info!("ICCID: {}", String::from_utf8_lossy(&iccid)),
        Err(e) => warn!("ICCID query failed: {e}"),
    }

    // ── 5. Data plane ─────────────────────────────────────────
    let mut gnss = GnssBuffer::with_capacity(GNSS_BUFFER_SIZE);
    loop {
        if modem.drain_gnss_rx(&mut gnss) > 0 {
            let sentences = complete_sentences(&mut gnss);
            if sentences > 0 {
                info!("GNSS: {sentences} NMEA sentences");
            }
        }
        modem.bypass();
        FreeRtos::delay_ms(MAIN_LOOP_DELAY_MS);
    }
}

/// Count and drop every complete NMEA line at the front of `gnss`,
/// leaving a trailing partial sentence in place.
fn complete_sentences(gnss: &mut GnssBuffer) -> usize {
    let data = gnss.make_contiguous();
    let Some(last_newline) = data.iter().rposition(|&b| b == b'\n') else {
        return 0;
    };
    let sentences = data[..=last_newline].iter().filter(|&&b| b == b'\n').count();
    gnss.consume(last_newline + 1);
    sentences
}
