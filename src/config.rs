//! Modem configuration parameters
//!
//! Timing constants, retry bounds, the host identity template inputs and
//! the behaviour flags that select the reconciliation/registration
//! policy.  Every value has a production default; provisioning tools can
//! override them from JSON.

use serde::{Deserialize, Serialize};

use crate::at::network::MnoProfile;

/// Core modem configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModemConfig {
    // --- Power ---
    /// Maximum time to wait for the AT interface after asserting power (ms)
    pub power_on_timeout_ms: u32,
    /// Liveness probe interval while powering on (ms)
    pub power_on_poll_ms: u32,
    /// Timeout of the `AT` liveness probe (ms)
    pub liveness_timeout_ms: u32,
    /// Probe interval while waiting for the module after a silent reset (ms)
    pub reset_recovery_poll_ms: u32,

    // --- Registration ---
    /// Delay between attach-status queries (ms)
    pub registration_poll_ms: u32,
    /// Time a denied/unregistered module gets before a forced reset (ms)
    pub registration_reset_after_ms: u32,
    /// Deadline used when `BehaviorFlags::bounded_registration` is set (ms)
    pub bounded_registration_ms: u32,

    // --- Host identity ---
    /// Registration attempts before giving up
    pub identity_attempts: u8,
    /// Delay between registration attempts (ms)
    pub identity_retry_delay_ms: u32,
    /// Inputs of the descriptor template
    pub host: HostDeviceProfile,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            // Power
            power_on_timeout_ms: 10_000,
            power_on_poll_ms: 50,
            liveness_timeout_ms: 1_000,
            reset_recovery_poll_ms: 100,

            // Registration
            registration_poll_ms: 2_000,
            registration_reset_after_ms: 30_000,
            bounded_registration_ms: 30_000,

            // Host identity
            identity_attempts: 10,
            identity_retry_delay_ms: 7_000,
            host: HostDeviceProfile::default(),
        }
    }
}

impl ModemConfig {
    /// Parse a (possibly partial) JSON document; absent fields keep their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would turn a bounded wait into a spin or a
    /// retry loop into a no-op.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.power_on_poll_ms == 0 || self.reset_recovery_poll_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll intervals must be non-zero"));
        }
        if self.registration_poll_ms == 0 {
            return Err(ConfigError::ValidationFailed("registration_poll_ms must be non-zero"));
        }
        if self.identity_attempts == 0 {
            return Err(ConfigError::ValidationFailed("identity_attempts must be at least 1"));
        }
        if self.power_on_timeout_ms < self.power_on_poll_ms {
            return Err(ConfigError::ValidationFailed(
                "power_on_timeout_ms shorter than one poll",
            ));
        }
        Ok(())
    }
}

/// Fixed inputs of the host device descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostDeviceProfile {
    pub device_id: String,
    pub device_id_short: String,
    pub board_name: String,
    pub sdk_version: String,
    /// Purpose used when the caller supplies none
    pub default_purpose: String,
}

impl Default for HostDeviceProfile {
    fn default() -> Self {
        Self {
            device_id: "Twilio-Alfa".into(),
            device_id_short: "alfa".into(),
            board_name: "WioLTE-Cat-NB1".into(),
            sdk_version: "0.1.0".into(),
            default_purpose: "devkit".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Behaviour flags
// ---------------------------------------------------------------------------

/// Regional radio tuning applied during reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionOverrides {
    /// NB1-only RAT, Berlin band mask, custom APN context.
    pub berlin: bool,
    /// NB1-only RAT, US band mask (2/4/5/12).
    pub us: bool,
}

impl RegionOverrides {
    pub fn any(&self) -> bool {
        self.berlin || self.us
    }
}

/// Independent options that steer `init_modem` and
/// `wait_for_network_registration`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorFlags {
    /// Reconcile to the vendor default profile instead of the carrier one.
    pub force_default_profile: bool,
    pub region: RegionOverrides,
    /// Give up on registration after `bounded_registration_ms`.
    pub bounded_registration: bool,
    /// Do not register host identity after attach.
    pub skip_host_identity: bool,
}

impl BehaviorFlags {
    pub const BIT_DEFAULT_PROFILE: u8 = 0x01;
    pub const BIT_REGION_BERLIN: u8 = 0x02;
    pub const BIT_BOUNDED_REGISTRATION: u8 = 0x04;
    pub const BIT_SKIP_HOST_IDENTITY: u8 = 0x08;
    pub const BIT_REGION_US: u8 = 0x10;

    /// Decode the legacy bitmask still emitted by older provisioning
    /// tools.  Undefined bits are ignored.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            force_default_profile: bits & Self::BIT_DEFAULT_PROFILE != 0,
            region: RegionOverrides {
                berlin: bits & Self::BIT_REGION_BERLIN != 0,
                us: bits & Self::BIT_REGION_US != 0,
            },
            bounded_registration: bits & Self::BIT_BOUNDED_REGISTRATION != 0,
            skip_host_identity: bits & Self::BIT_SKIP_HOST_IDENTITY != 0,
        }
    }

    /// Encode back into the legacy bitmask.
    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.force_default_profile {
            bits |= Self::BIT_DEFAULT_PROFILE;
        }
        if self.region.berlin {
            bits |= Self::BIT_REGION_BERLIN;
        }
        if self.bounded_registration {
            bits |= Self::BIT_BOUNDED_REGISTRATION;
        }
        if self.skip_host_identity {
            bits |= Self::BIT_SKIP_HOST_IDENTITY;
        }
        if self.region.us {
            bits |= Self::BIT_REGION_US;
        }
        bits
    }

    /// The profile reconciliation drives the module towards.
    pub fn expected_profile(&self) -> MnoProfile {
        if self.force_default_profile {
            MnoProfile::SwDefault
        } else {
            MnoProfile::Tmo
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON for [`ModemConfig`].
    Malformed,
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed config"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
