// ── Verification code aggregation ──

use tracing::error;

use crate::model::{Enrollment, TaskState};

/// Join the activation codes of `records` onto `base`, skipping devices
/// without a code. `None` when no device has one.
pub fn verification_link<'a, D: 'a>(
    base: &str,
    records: impl IntoIterator<Item = &'a Enrollment<D>>,
) -> Option<String> {
    let codes: Vec<&str> = records
        .into_iter()
        .filter_map(Enrollment::user_code)
        .collect();
    if codes.is_empty() {
        None
    } else {
        Some(format!("{base}{}", codes.join(",")))
    }
}

/// Build the single activation link for the devices queued for monitoring.
///
/// Without any code the operator has nothing to act on, so every queued
/// device that is not already finished is marked as failed and `None` is
/// returned; monitoring must not start in that case.
pub fn aggregate_codes<D>(base: &str, queued: &mut [&mut Enrollment<D>]) -> Option<String> {
    let link = verification_link(base, queued.iter().map(|e| &**e));
    if link.is_none() && !queued.is_empty() {
        error!("no user codes received from any RSC");
        for enrollment in queued.iter_mut() {
            if !enrollment.state().is_terminal() {
                enrollment.advance(TaskState::Error);
            }
        }
    }
    link
}
