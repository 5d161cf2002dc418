use tracing::debug;

use super::entry::DeviceEntry;
use super::state::TaskState;

/// Per-device enrollment record, owned by the orchestrator for one run.
///
/// Pairs the operator-supplied entry with the device capability and tracks
/// the activation code and task state. Only the orchestrator mutates it.
///
/// Side effects the operator has to know about survive here even when a
/// later step fails: a rotated password, or a cancel request the device
/// refused.
#[derive(Debug)]
pub struct Enrollment<D> {
    entry: DeviceEntry,
    device: D,
    user_code: Option<String>,
    state: TaskState,
    password_changed: bool,
    cancel_error: Option<String>,
}

impl<D> Enrollment<D> {
    pub fn new(entry: DeviceEntry, device: D) -> Self {
        Self {
            entry,
            device,
            user_code: None,
            state: TaskState::NotStarted,
            password_changed: false,
            cancel_error: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.entry.address
    }

    pub fn entry(&self) -> &DeviceEntry {
        &self.entry
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Activation code issued when enrollment started, if any.
    pub fn user_code(&self) -> Option<&str> {
        self.user_code.as_deref()
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    /// The device now uses the entry's new password.
    pub fn password_changed(&self) -> bool {
        self.password_changed
    }

    /// Why the cancel request for this device failed, if it did.
    pub fn cancel_error(&self) -> Option<&str> {
        self.cancel_error.as_deref()
    }

    /// Running with a monitor handle.
    pub fn is_monitored(&self) -> bool {
        self.state.is_in_progress()
    }

    pub(crate) fn set_user_code(&mut self, code: Option<String>) {
        self.user_code = code.filter(|c| !c.is_empty());
    }

    pub(crate) fn mark_password_changed(&mut self) {
        self.password_changed = true;
    }

    pub(crate) fn set_cancel_error(&mut self, reason: String) {
        self.cancel_error = Some(reason);
    }

    /// Apply a state transition; illegal transitions are dropped.
    pub(crate) fn advance(&mut self, next: TaskState) -> bool {
        let from = self.state.to_string();
        let applied = self.state.advance(next);
        if applied {
            debug!(rsc = %self.entry.address, %from, to = %self.state, "task state changed");
        }
        applied
    }
}
