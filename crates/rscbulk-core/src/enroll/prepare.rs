// ── Preparation pipeline ──
//
// login -> password rotation (when the device demands it) -> proxy/NTP.
// Each step short-circuits with a device-scoped error.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::device::Device;
use crate::error::DeviceError;
use crate::model::{Enrollment, NetworkSettings};

/// Get one device ready for enrollment.
///
/// A successful password rotation is recorded on `enrollment` right away,
/// so it shows up in the report even if a later step fails. The settle
/// delay after applying network settings ends early when `cancel` fires;
/// the caller decides what to do with the cancellation.
pub async fn prepare<D: Device>(
    enrollment: &mut Enrollment<D>,
    network: &NetworkSettings,
    settle_delay: Duration,
    cancel: &CancellationToken,
) -> Result<(), DeviceError> {
    info!(rsc = %enrollment.address(), "logging in");
    enrollment.device().authenticate().await?;

    if enrollment.device().needs_credential_rotation().await? {
        let Some(new_password) = enrollment.entry().new_password.as_ref() else {
            return Err(DeviceError::Credential {
                address: enrollment.address().to_owned(),
                reason: "a password change is required but no new password was given".into(),
            });
        };
        info!(rsc = %enrollment.address(), "changing password");
        enrollment.device().rotate_credential(new_password).await?;
        enrollment.mark_password_changed();
        info!(rsc = %enrollment.address(), "logging in with new password");
        enrollment.device().authenticate().await?;
    }

    if !network.is_empty() {
        info!(rsc = %enrollment.address(), proxy = ?network.proxy, ntp = ?network.ntp, "changing proxy/NTP settings");
        enrollment.device().apply_network_settings(network).await?;
        tokio::select! {
            () = cancel.cancelled() => {}
            () = tokio::time::sleep(settle_delay) => {}
        }
    }

    Ok(())
}
