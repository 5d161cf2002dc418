// ── Core error types ──
//
// Two layers: `DeviceError` is scoped to one RSC and never aborts a batch;
// `CoreError` covers batch-level preconditions and input problems.
// Transport details from `rscbulk_api::Error` are flattened into the
// device error's reason string at the device boundary.

use std::path::PathBuf;

use thiserror::Error;

use crate::credentials::ValidationReport;

/// Failure of a single device operation.
///
/// Every variant carries the device address so log lines and reports can
/// name the device without extra context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("RSC '{address}': login failed: {reason}")]
    Auth { address: String, reason: String },

    #[error("RSC '{address}': password change failed: {reason}")]
    Credential { address: String, reason: String },

    #[error("RSC '{address}': applying proxy/NTP settings failed: {reason}")]
    Settings { address: String, reason: String },

    #[error("RSC '{address}': cloud enrollment failed: {reason}")]
    Enroll { address: String, reason: String },

    #[error("RSC '{address}': enrollment status query failed: {reason}")]
    Poll { address: String, reason: String },

    #[error("RSC '{address}': cancelling enrollment failed: {reason}")]
    Cancel { address: String, reason: String },
}

impl DeviceError {
    /// Address of the device the error belongs to.
    pub fn address(&self) -> &str {
        match self {
            Self::Auth { address, .. }
            | Self::Credential { address, .. }
            | Self::Settings { address, .. }
            | Self::Enroll { address, .. }
            | Self::Poll { address, .. }
            | Self::Cancel { address, .. } => address,
        }
    }
}

/// Batch-level error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration errors ─────────────────────────────────────────
    /// One or more devices failed credential validation. Nothing was
    /// changed on any device.
    #[error("Credential validation failed for {} of {} RSC(s)", .report.issues().len(), .report.checked())]
    Validation { report: ValidationReport },

    /// A device was queued for monitoring without a running enrollment
    /// task. This is an internal invariant breach, not a device problem.
    #[error("RSC '{address}' was queued for monitoring but has no enrollment task in progress")]
    NotMonitorable { address: String },

    #[error("Cannot build client for RSC '{address}': {reason}")]
    Client { address: String, reason: String },

    #[error("RSC discovery failed: {reason}")]
    Discovery { reason: String },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Error in line {line} ('{content}'): {reason}")]
    Import {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("Cannot read device list {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
