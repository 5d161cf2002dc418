// ── Device capability ──
//
// The operations the orchestrator needs from one RSC. The HTTP
// implementation lives in `rsc.rs`; tests script their own.

use std::future::Future;

use secrecy::SecretString;

use crate::error::DeviceError;
use crate::model::{BindStatus, MonitorHandle, NetworkSettings};

/// A started enrollment task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentTicket {
    pub handle: MonitorHandle,
    /// Activation code for the cloud console. Devices may omit it.
    pub user_code: Option<String>,
}

/// One remote device that can be enrolled into cloud management.
///
/// Every error is scoped to the device and carries its address.
pub trait Device {
    /// Log in with the credential currently in force.
    fn authenticate(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;

    /// Whether the device insists on a password change (factory default
    /// or expired credential) before anything else is allowed.
    fn needs_credential_rotation(&self) -> impl Future<Output = Result<bool, DeviceError>> + Send;

    /// Replace the account password; later logins use `new`.
    fn rotate_credential(
        &self,
        new: &SecretString,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn apply_network_settings(
        &self,
        settings: &NetworkSettings,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn is_cloud_enrolled(&self) -> impl Future<Output = Result<bool, DeviceError>> + Send;

    fn start_cloud_enrollment(
        &self,
    ) -> impl Future<Output = Result<EnrollmentTicket, DeviceError>> + Send;

    fn poll_status(
        &self,
        handle: &MonitorHandle,
    ) -> impl Future<Output = Result<BindStatus, DeviceError>> + Send;

    /// Best effort; callers log failures and move on.
    fn cancel_enrollment(
        &self,
        handle: &MonitorHandle,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;
}
