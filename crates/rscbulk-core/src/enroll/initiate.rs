// ── Enrollment initiation ──
//
// Starts cloud enrollment on prepared devices and sorts them into
// "already enrolled" and "needs monitoring". Per-device failures are
// logged and the device stays out of later stages.

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::prepare::prepare;
use crate::config::EnrollConfig;
use crate::device::Device;
use crate::error::DeviceError;
use crate::model::{Enrollment, TaskState};

/// What happened when enrollment was requested for one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initiation {
    /// Bound before this run; nothing to monitor.
    AlreadyEnrolled,
    /// Task running; the record now holds its handle.
    Started,
}

/// Start cloud enrollment for one prepared device.
pub async fn initiate<D: Device>(enrollment: &mut Enrollment<D>) -> Result<Initiation, DeviceError> {
    if enrollment.device().is_cloud_enrolled().await? {
        info!(rsc = %enrollment.address(), "already enrolled to cloud");
        enrollment.advance(TaskState::AlreadyEnrolled);
        return Ok(Initiation::AlreadyEnrolled);
    }

    info!(rsc = %enrollment.address(), "enrolling to cloud");
    let ticket = enrollment.device().start_cloud_enrollment().await?;
    enrollment.set_user_code(ticket.user_code);
    enrollment.advance(TaskState::InProgress(ticket.handle));
    Ok(Initiation::Started)
}

/// Run the preparation pipeline and initiation over the whole batch.
///
/// Returns the indices of records now in progress, in input order. Devices
/// that fail any step are skipped. When `cancel` fires, devices not reached
/// yet are left untouched and the loop stops.
pub async fn enroll_all<D: Device>(
    records: &mut [Enrollment<D>],
    config: &EnrollConfig,
    cancel: &CancellationToken,
) -> Vec<usize> {
    let mut queued = Vec::new();

    for (idx, enrollment) in records.iter_mut().enumerate() {
        if cancel.is_cancelled() {
            warn!(rsc = %enrollment.address(), "interrupted before this RSC was processed");
            break;
        }

        match prepare_and_initiate(enrollment, config, cancel).await {
            Ok(Some(Initiation::Started)) => queued.push(idx),
            Ok(Some(Initiation::AlreadyEnrolled)) => {}
            Ok(None) => {
                warn!(rsc = %enrollment.address(), "interrupted before enrollment was started");
                break;
            }
            Err(err) => error!(rsc = %err.address(), "{err}"),
        }
    }

    queued
}

async fn prepare_and_initiate<D: Device>(
    enrollment: &mut Enrollment<D>,
    config: &EnrollConfig,
    cancel: &CancellationToken,
) -> Result<Option<Initiation>, DeviceError> {
    prepare(enrollment, &config.network, config.settle_delay, cancel).await?;
    if cancel.is_cancelled() {
        return Ok(None);
    }
    initiate(enrollment).await.map(Some)
}
