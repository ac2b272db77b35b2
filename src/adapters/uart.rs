//! [`SerialPort`] for the ESP-IDF UART driver.

use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::uart::UartDriver;
use esp_idf_svc::sys::EspError;
use log::warn;

use crate::app::ports::SerialPort;

impl SerialPort for UartDriver<'_> {
    type Error = EspError;

    fn available(&mut self) -> usize {
        match self.remaining_read() {
            Ok(n) => n,
            Err(e) => {
                warn!("UART remaining_read failed: {e}");
                0
            }
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, EspError> {
        UartDriver::read(self, buf, NON_BLOCK)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, EspError> {
        UartDriver::write(self, data)
    }
}
