//! Host identity descriptor.
//!
//! The module is told who its host is with `AT+UHOSTDEV`.  The descriptor
//! combines the configured host profile with the module's own
//! manufacturer, model and firmware strings:
//!
//! ```text
//! long:  "<device_id>_<purpose>","Twilio_<mfgr>","<board>_<model>","twilio-v<sdk>_<mfgr>-v<fw>"
//! short: v<sdk>/<device_id_short>
//! ```

use core::fmt::Write;

use log::{info, warn};

use super::Modem;
use crate::app::ports::{AtPort, Clock, PowerControl, SerialPort};
use crate::at::device::SetHostDevice;
use crate::at::information::{GetDeviceInfo, InfoField};
use crate::at::BoundedWriter;
use crate::config::HostDeviceProfile;
use crate::error::{Error, Result};

/// Module metadata strings are cut to this many bytes before use.
pub const METADATA_FIELD_MAX: usize = 64;
/// Capacity of each descriptor form.
pub const IDENTITY_MAX: usize = 256;

type Descriptor = heapless::String<IDENTITY_MAX>;

/// Cached long and short identity descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostIdentity {
    long: Descriptor,
    short: Descriptor,
}

impl HostIdentity {
    /// Compose both forms.  Output beyond [`IDENTITY_MAX`] bytes is cut.
    pub fn compose(
        host: &HostDeviceProfile,
        purpose: &str,
        manufacturer: &[u8],
        model: &[u8],
        firmware: &[u8],
    ) -> Self {
        let manufacturer = metadata_text(manufacturer);
        let model = metadata_text(model);
        let firmware = metadata_text(firmware);

        let mut identity = Self::default();
        // BoundedWriter never fails.
        let _ = write!(
            BoundedWriter::new(&mut identity.long),
            "\"{}_{}\",\"Twilio_{}\",\"{}_{}\",\"twilio-v{}_{}-v{}\"",
            host.device_id,
            purpose,
            manufacturer,
            host.board_name,
            model,
            host.sdk_version,
            manufacturer,
            firmware,
        );
        let _ = write!(
            BoundedWriter::new(&mut identity.short),
            "v{}/{}",
            host.sdk_version,
            host.device_id_short,
        );
        identity
    }

    pub fn long(&self) -> &str {
        &self.long
    }

    pub fn short(&self) -> &str {
        &self.short
    }
}

/// Decode `raw` and keep at most [`METADATA_FIELD_MAX`] bytes, cut on a
/// character boundary.
fn metadata_text(raw: &[u8]) -> heapless::String<METADATA_FIELD_MAX> {
    let mut text = heapless::String::new();
    let _ = BoundedWriter::new(&mut text).write_str(&String::from_utf8_lossy(raw));
    text
}

impl<A, P, C, D, G> Modem<A, P, C, D, G>
where
    A: AtPort,
    P: PowerControl,
    C: Clock,
    D: SerialPort,
    G: SerialPort,
{
    /// Query the module metadata and rebuild the cached descriptor for
    /// `purpose`.  A failed query leaves its field empty.
    pub fn compute_host_device_information(&mut self, purpose: &str) -> &HostIdentity {
        let manufacturer = self.metadata(InfoField::Manufacturer);
        let model = self.metadata(InfoField::Model);
        let firmware = self.metadata(InfoField::Revision);

        let identity = HostIdentity::compose(&self.config.host, purpose, &manufacturer, &model, &firmware);
        self.identity.insert(identity)
    }

    /// Recompute the descriptor and send it with `AT+UHOSTDEV`, retrying
    /// up to `identity_attempts` times.  `None` or an empty purpose means
    /// the configured default purpose.
    pub fn set_host_device_information(&mut self, purpose: Option<&str>) -> Result<()> {
        let purpose = match purpose {
            Some(p) if !p.is_empty() => p.to_owned(),
            _ => self.config.host.default_purpose.clone(),
        };
        let descriptor = self.compute_host_device_information(&purpose).long().to_owned();
        info!("Setting HostDeviceInformation to: {descriptor}");

        let attempts = self.config.identity_attempts;
        for attempt in 1..=attempts {
            if self.send(&SetHostDevice { descriptor: &descriptor }).is_ok() {
                info!(".. setting HostDeviceInformation successful");
                return Ok(());
            }
            if attempt < attempts {
                info!(".. setting HostDeviceInformation failed - will retry after a short delay");
                self.clock.delay_ms(self.config.identity_retry_delay_ms);
            }
        }

        warn!("Setting HostDeviceInformation failed after {attempts} attempts");
        Err(Error::HostIdentity { attempts })
    }

    /// Long descriptor, computed with the default purpose on first use.
    pub fn host_device_information(&mut self) -> &str {
        self.cached_identity().long()
    }

    /// Short descriptor, computed with the default purpose on first use.
    pub fn short_host_device_information(&mut self) -> &str {
        self.cached_identity().short()
    }

    fn cached_identity(&mut self) -> &HostIdentity {
        if self.identity.is_none() {
            let purpose = self.config.host.default_purpose.clone();
            self.compute_host_device_information(&purpose);
        }
        self.identity.get_or_insert_with(HostIdentity::default)
    }

    fn metadata(&mut self, field: InfoField) -> Vec<u8> {
        self.send(&GetDeviceInfo(field)).unwrap_or_else(|e| {
            warn!("Failed to read {field:?}: {e}");
            Vec::new()
        })
    }
}
