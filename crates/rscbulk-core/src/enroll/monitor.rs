// ── Enrollment monitor ──
//
// Polls every in-flight device once per pass, pauses, repeats until all
// are finished. The cancellation token is raced against both the pass and
// the pause; on cancellation every device still running gets a cancel
// call and ends up `Cancelled`.

use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::MonitorOptions;
use crate::device::Device;
use crate::error::CoreError;
use crate::model::{BindStatus, Enrollment, TaskState};

/// How the monitor loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Every device reached a terminal state.
    Completed,
    /// The operator interrupted; running devices were cancelled.
    Cancelled,
    /// `max_passes` ran out with devices still in progress.
    PassLimitReached,
}

/// Watch the enrollment tasks of `queued` until they finish or `cancel`
/// fires.
///
/// Every queued device must be in progress; anything else is reported as
/// [`CoreError::NotMonitorable`] before a single poll is sent.
pub async fn monitor<D: Device>(
    queued: &mut [&mut Enrollment<D>],
    options: &MonitorOptions,
    cancel: &CancellationToken,
) -> Result<MonitorOutcome, CoreError> {
    if let Some(bad) = queued.iter().find(|e| !e.is_monitored()) {
        return Err(CoreError::NotMonitorable {
            address: bad.address().to_owned(),
        });
    }

    let mut running = queued.len();
    let mut passes: u32 = 0;

    while running > 0 {
        if options.max_passes.is_some_and(|max| passes >= max) {
            warn!(passes, running, "pass limit reached, leaving RSCs in progress");
            return Ok(MonitorOutcome::PassLimitReached);
        }

        let finished = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            finished = poll_pass(queued) => Some(finished),
        };
        let Some(finished) = finished else {
            cancel_in_flight(queued).await;
            return Ok(MonitorOutcome::Cancelled);
        };

        running -= finished;
        passes += 1;
        debug!(pass = passes, running, "monitor pass complete");
        // No pause after the last pass; the limit check above ends the loop.
        if running == 0 || options.max_passes.is_some_and(|max| passes >= max) {
            continue;
        }

        let interrupted = tokio::select! {
            biased;
            () = cancel.cancelled() => true,
            () = tokio::time::sleep(options.poll_interval) => false,
        };
        if interrupted {
            cancel_in_flight(queued).await;
            return Ok(MonitorOutcome::Cancelled);
        }
    }

    Ok(MonitorOutcome::Completed)
}

/// Poll every device still in progress, concurrently. Returns how many
/// reached a terminal state in this pass.
async fn poll_pass<D: Device>(queued: &mut [&mut Enrollment<D>]) -> usize {
    let polls = queued
        .iter_mut()
        .filter(|e| e.is_monitored())
        .map(|e| poll_one(e));
    join_all(polls).await.into_iter().filter(|done| *done).count()
}

async fn poll_one<D: Device>(enrollment: &mut Enrollment<D>) -> bool {
    let Some(handle) = enrollment.state().monitor_handle().cloned() else {
        return false;
    };

    match enrollment.device().poll_status(&handle).await {
        Ok(BindStatus::InProgress) => {
            info!(rsc = %enrollment.address(), "enrollment in progress...");
            false
        }
        Ok(status) => {
            if status == BindStatus::Success {
                info!(rsc = %enrollment.address(), "enrolled successfully");
            } else {
                warn!(rsc = %enrollment.address(), "enrollment was NOT successful");
            }
            status
                .terminal_state()
                .is_some_and(|next| enrollment.advance(next))
        }
        Err(err) => {
            // Transient: try again next pass.
            error!(rsc = %err.address(), "{err}");
            false
        }
    }
}

/// Cancel every device still in progress. Does not look at the token
/// again, so a second interrupt cannot cut this short. A refused cancel
/// request is kept on the record; the device still ends up `Cancelled`.
async fn cancel_in_flight<D: Device>(queued: &mut [&mut Enrollment<D>]) {
    warn!("interrupted, cancelling enrollment");
    for enrollment in queued.iter_mut() {
        let Some(handle) = enrollment.state().monitor_handle().cloned() else {
            continue;
        };
        match enrollment.device().cancel_enrollment(&handle).await {
            Ok(()) => info!(rsc = %enrollment.address(), "enrollment cancelled"),
            Err(err) => {
                warn!(rsc = %err.address(), "{err}");
                enrollment.set_cancel_error(err.to_string());
            }
        }
        enrollment.advance(TaskState::Cancelled);
    }
}
