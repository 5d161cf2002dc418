// Scripted in-memory device for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use secrecy::SecretString;

use crate::device::{Device, EnrollmentTicket};
use crate::error::DeviceError;
use crate::model::{BindStatus, DeviceEntry, Enrollment, MonitorHandle, NetworkSettings};

/// Shared record of the operations a device received, in call order.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    fn push(&self, op: &'static str) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(op);
    }

    pub(crate) fn ops(&self) -> Vec<&'static str> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn count(&self, op: &str) -> usize {
        self.ops().into_iter().filter(|o| *o == op).count()
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug)]
pub(crate) struct MockDevice {
    address: String,
    login_fails: bool,
    login_delay: Duration,
    rotation_required: bool,
    rotation_fails: bool,
    settings_fail: bool,
    enrolled: bool,
    enroll_fails: bool,
    cancel_fails: bool,
    user_code: Option<String>,
    /// `None` scripts a failed poll. Once drained, every poll says in progress.
    polls: Mutex<VecDeque<Option<BindStatus>>>,
    calls: CallLog,
}

impl MockDevice {
    pub(crate) fn new(address: &str) -> Self {
        Self {
            address: address.to_owned(),
            login_fails: false,
            login_delay: Duration::ZERO,
            rotation_required: false,
            rotation_fails: false,
            settings_fail: false,
            enrolled: false,
            enroll_fails: false,
            cancel_fails: false,
            user_code: Some(format!("CODE-{address}")),
            polls: Mutex::new(VecDeque::new()),
            calls: CallLog::default(),
        }
    }

    pub(crate) fn failing_login(mut self) -> Self {
        self.login_fails = true;
        self
    }

    /// Every login takes this long.
    pub(crate) fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = delay;
        self
    }

    pub(crate) fn requiring_rotation(mut self) -> Self {
        self.rotation_required = true;
        self
    }

    /// Demands a new password and then rejects it.
    pub(crate) fn failing_rotation(mut self) -> Self {
        self.rotation_required = true;
        self.rotation_fails = true;
        self
    }

    pub(crate) fn failing_settings(mut self) -> Self {
        self.settings_fail = true;
        self
    }

    pub(crate) fn already_enrolled(mut self) -> Self {
        self.enrolled = true;
        self
    }

    pub(crate) fn failing_enroll(mut self) -> Self {
        self.enroll_fails = true;
        self
    }

    pub(crate) fn failing_cancel(mut self) -> Self {
        self.cancel_fails = true;
        self
    }

    pub(crate) fn with_code(mut self, code: Option<&str>) -> Self {
        self.user_code = code.map(str::to_owned);
        self
    }

    pub(crate) fn with_polls(self, script: impl IntoIterator<Item = Option<BindStatus>>) -> Self {
        self.polls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(script);
        self
    }

    pub(crate) fn calls(&self) -> CallLog {
        self.calls.clone()
    }

    fn handle(&self) -> MonitorHandle {
        MonitorHandle::new(format!("/api/v1/tasks/{}", self.address))
            .expect("handle is never empty")
    }
}

/// Record for `device` with current password `pw` and the given replacement.
pub(crate) fn record(device: MockDevice, new_password: Option<&str>) -> Enrollment<MockDevice> {
    let entry = DeviceEntry::new(device.address.clone(), "pw", new_password.map(str::to_owned));
    Enrollment::new(entry, device)
}

impl Device for MockDevice {
    async fn authenticate(&self) -> Result<(), DeviceError> {
        self.calls.push("authenticate");
        if !self.login_delay.is_zero() {
            tokio::time::sleep(self.login_delay).await;
        }
        if self.login_fails {
            return Err(DeviceError::Auth {
                address: self.address.clone(),
                reason: "invalid credentials".into(),
            });
        }
        Ok(())
    }

    async fn needs_credential_rotation(&self) -> Result<bool, DeviceError> {
        self.calls.push("needs_credential_rotation");
        Ok(self.rotation_required)
    }

    async fn rotate_credential(&self, _new: &SecretString) -> Result<(), DeviceError> {
        self.calls.push("rotate_credential");
        if self.rotation_fails {
            return Err(DeviceError::Credential {
                address: self.address.clone(),
                reason: "password rejected by policy".into(),
            });
        }
        Ok(())
    }

    async fn apply_network_settings(&self, _settings: &NetworkSettings) -> Result<(), DeviceError> {
        self.calls.push("apply_network_settings");
        if self.settings_fail {
            return Err(DeviceError::Settings {
                address: self.address.clone(),
                reason: "invalid proxy URL".into(),
            });
        }
        Ok(())
    }

    async fn is_cloud_enrolled(&self) -> Result<bool, DeviceError> {
        self.calls.push("is_cloud_enrolled");
        Ok(self.enrolled)
    }

    async fn start_cloud_enrollment(&self) -> Result<EnrollmentTicket, DeviceError> {
        self.calls.push("start_cloud_enrollment");
        if self.enroll_fails {
            return Err(DeviceError::Enroll {
                address: self.address.clone(),
                reason: "HTTP 500".into(),
            });
        }
        Ok(EnrollmentTicket {
            handle: self.handle(),
            user_code: self.user_code.clone(),
        })
    }

    async fn poll_status(&self, _handle: &MonitorHandle) -> Result<BindStatus, DeviceError> {
        self.calls.push("poll_status");
        let next = self
            .polls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(Some(status)) => Ok(status),
            Some(None) => Err(DeviceError::Poll {
                address: self.address.clone(),
                reason: "connection reset".into(),
            }),
            None => Ok(BindStatus::InProgress),
        }
    }

    async fn cancel_enrollment(&self, _handle: &MonitorHandle) -> Result<(), DeviceError> {
        self.calls.push("cancel_enrollment");
        if self.cancel_fails {
            return Err(DeviceError::Cancel {
                address: self.address.clone(),
                reason: "HTTP 404".into(),
            });
        }
        Ok(())
    }
}
