// ── Credential checks and password-only runs ──
//
// Validation logs into every device before anything is changed, so a batch
// with a wrong password or a missing replacement password is refused as a
// whole instead of leaving some devices half configured.

use std::fmt;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::device::Device;
use crate::error::DeviceError;
use crate::model::Enrollment;

/// Why a device did not pass validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationProblem {
    /// Login (or the rotation check) failed.
    Device(DeviceError),
    /// The device demands a new password and none was supplied.
    NewPasswordMissing,
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(err) => write!(f, "{err}"),
            Self::NewPasswordMissing => {
                f.write_str("password change required, but no new password given")
            }
        }
    }
}

impl Serialize for ValidationProblem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub address: String,
    pub problem: ValidationProblem,
}

/// Outcome of [`validate_credentials`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    checked: usize,
    issues: Vec<ValidationIssue>,
    interrupted: bool,
}

impl ValidationReport {
    /// Number of devices that were checked.
    pub fn checked(&self) -> usize {
        self.checked
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// The run was cancelled before every device was checked.
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    /// Every device was checked and none had a problem.
    pub fn is_clean(&self) -> bool {
        !self.interrupted && self.issues.is_empty()
    }
}

/// Log into every device and check that its credentials are usable.
///
/// Read-only: nothing is changed on any device. Stops as soon as `cancel`
/// fires, abandoning the check in flight; the report is then marked
/// interrupted and only counts the devices that finished.
pub async fn validate_credentials<'a, D: Device + 'a>(
    records: impl IntoIterator<Item = &'a Enrollment<D>>,
    cancel: &CancellationToken,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    for enrollment in records {
        let address = enrollment.address();
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            outcome = check_one(enrollment) => Some(outcome),
        };
        let Some(outcome) = outcome else {
            warn!(rsc = %address, "interrupted during credential validation");
            report.interrupted = true;
            break;
        };

        report.checked += 1;
        match outcome {
            Ok(()) => info!(rsc = %address, "credentials valid"),
            Err(problem) => {
                warn!(rsc = %address, "{problem}");
                report.issues.push(ValidationIssue {
                    address: address.to_owned(),
                    problem,
                });
            }
        }
    }

    report
}

async fn check_one<D: Device>(enrollment: &Enrollment<D>) -> Result<(), ValidationProblem> {
    let device = enrollment.device();
    device
        .authenticate()
        .await
        .map_err(ValidationProblem::Device)?;
    let rotation = device
        .needs_credential_rotation()
        .await
        .map_err(ValidationProblem::Device)?;
    if rotation && !enrollment.entry().has_new_password() {
        return Err(ValidationProblem::NewPasswordMissing);
    }
    Ok(())
}

/// Result of a password-only run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordChangeReport {
    pub changed: Vec<String>,
    pub failed: Vec<DeviceError>,
}

impl PasswordChangeReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Set `new_password` on every device, whether or not the device asks for
/// it. A failure on one device does not stop the others.
pub async fn change_passwords<'a, D: Device + 'a>(
    records: impl IntoIterator<Item = &'a Enrollment<D>>,
) -> PasswordChangeReport {
    let mut report = PasswordChangeReport::default();

    for enrollment in records {
        match change_one(enrollment).await {
            Ok(()) => {
                info!(rsc = %enrollment.address(), "password changed");
                report.changed.push(enrollment.address().to_owned());
            }
            Err(err) => {
                error!(rsc = %err.address(), "{err}");
                report.failed.push(err);
            }
        }
    }

    report
}

async fn change_one<D: Device>(enrollment: &Enrollment<D>) -> Result<(), DeviceError> {
    let Some(new_password) = enrollment.entry().new_password.as_ref() else {
        return Err(DeviceError::Credential {
            address: enrollment.address().to_owned(),
            reason: "no new password given".into(),
        });
    };
    let device = enrollment.device();
    device.authenticate().await?;
    device.rotate_credential(new_password).await
}
