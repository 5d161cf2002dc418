// ── Runtime configuration ──
//
// These types describe *how* to talk to the RSCs and how to pace the run.
// They never touch disk: the CLI builds them from its config file and flags
// and hands them in.

use std::path::PathBuf;
use std::time::Duration;

use crate::model::NetworkSettings;

/// Activation page of the cloud console; user codes are appended
/// comma-separated.
pub const DEFAULT_VERIFICATION_URI: &str =
    "https://rsm.anyware.hp.com/console/binding/device/activate?user_codes=";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. RSCs ship with self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// How to reach every RSC in the batch.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Management account name.
    pub username: String,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            username: rscbulk_api::DEFAULT_USERNAME.into(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Pacing of the monitor loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Pause between two polling passes.
    pub poll_interval: Duration,
    /// Stop after this many passes, leaving unfinished devices in progress.
    /// `None` polls until every device finishes or the operator cancels.
    pub max_passes: Option<u32>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_passes: None,
        }
    }
}

/// Everything the batch orchestrator needs besides the devices.
#[derive(Debug, Clone)]
pub struct EnrollConfig {
    pub network: NetworkSettings,
    /// Pause after pushing proxy/NTP settings so the device can settle.
    pub settle_delay: Duration,
    pub verification_uri: String,
    pub monitor: MonitorOptions,
}

impl Default for EnrollConfig {
    fn default() -> Self {
        Self {
            network: NetworkSettings::default(),
            settle_delay: Duration::from_secs(2),
            verification_uri: DEFAULT_VERIFICATION_URI.into(),
            monitor: MonitorOptions::default(),
        }
    }
}
