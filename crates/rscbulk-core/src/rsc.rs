// ── HTTP-backed device ──
//
// Adapts `rscbulk_api::RscClient` to the `Device` capability. Transport
// errors are flattened into device-scoped errors tagged with the stage
// that failed.

use secrecy::SecretString;
use tracing::debug;

use rscbulk_api::transport::{TlsMode, TransportConfig};
use rscbulk_api::{CloudAccess, RscClient, TaskPhase};

use crate::config::{ConnectionConfig, TlsVerification};
use crate::device::{Device, EnrollmentTicket};
use crate::error::{CoreError, DeviceError};
use crate::model::{BindStatus, DeviceEntry, Enrollment, MonitorHandle, NetworkSettings};

/// An RSC reached over its HTTPS management API.
pub struct RscDevice {
    address: String,
    client: RscClient,
}

impl std::fmt::Debug for RscDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RscDevice")
            .field("address", &self.address)
            .field("base_url", &self.client.base_url().as_str())
            .finish_non_exhaustive()
    }
}

impl RscDevice {
    /// Build a client for `https://{entry.address}` with its own session.
    pub fn connect(entry: &DeviceEntry, config: &ConnectionConfig) -> Result<Self, CoreError> {
        let transport = build_transport(config);
        let client = RscClient::for_address(
            &entry.address,
            config.username.clone(),
            entry.old_password.clone(),
            &transport,
        )
        .map_err(|e| CoreError::Client {
            address: entry.address.clone(),
            reason: e.to_string(),
        })?;
        debug!(rsc = %entry.address, "client ready");
        Ok(Self::from_client(entry.address.clone(), client))
    }

    /// Wrap an existing client (tests point one at a mock server).
    pub fn from_client(address: impl Into<String>, client: RscClient) -> Self {
        Self {
            address: address.into(),
            client,
        }
    }

    fn fail<'a, F>(&'a self, stage: F) -> impl Fn(rscbulk_api::Error) -> DeviceError + 'a
    where
        F: Fn(String, String) -> DeviceError + 'a,
    {
        move |err| stage(self.address.clone(), err.to_string())
    }
}

/// Build one enrollment record per entry, each with its own client.
pub fn connect_all(
    entries: Vec<DeviceEntry>,
    config: &ConnectionConfig,
) -> Result<Vec<Enrollment<RscDevice>>, CoreError> {
    entries
        .into_iter()
        .map(|entry| {
            let device = RscDevice::connect(&entry, config)?;
            Ok(Enrollment::new(entry, device))
        })
        .collect()
}

fn build_transport(config: &ConnectionConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        timeout: config.timeout,
        cookie_jar: None,
    }
    .with_cookie_jar()
}

fn auth(address: String, reason: String) -> DeviceError {
    DeviceError::Auth { address, reason }
}
fn credential(address: String, reason: String) -> DeviceError {
    DeviceError::Credential { address, reason }
}
fn settings(address: String, reason: String) -> DeviceError {
    DeviceError::Settings { address, reason }
}
fn enroll(address: String, reason: String) -> DeviceError {
    DeviceError::Enroll { address, reason }
}
fn poll(address: String, reason: String) -> DeviceError {
    DeviceError::Poll { address, reason }
}
fn cancel(address: String, reason: String) -> DeviceError {
    DeviceError::Cancel { address, reason }
}

impl Device for RscDevice {
    async fn authenticate(&self) -> Result<(), DeviceError> {
        self.client.login().await.map_err(self.fail(auth))
    }

    async fn needs_credential_rotation(&self) -> Result<bool, DeviceError> {
        self.client
            .password_change_required()
            .await
            .map_err(self.fail(auth))
    }

    async fn rotate_credential(&self, new: &SecretString) -> Result<(), DeviceError> {
        self.client
            .change_password(new)
            .await
            .map_err(self.fail(credential))
    }

    async fn apply_network_settings(&self, network: &NetworkSettings) -> Result<(), DeviceError> {
        let body = CloudAccess {
            proxy: network.proxy.clone(),
            ntp: network.ntp.clone(),
        };
        self.client
            .set_cloud_access(&body)
            .await
            .map_err(self.fail(settings))
    }

    async fn is_cloud_enrolled(&self) -> Result<bool, DeviceError> {
        self.client.is_bound().await.map_err(self.fail(enroll))
    }

    async fn start_cloud_enrollment(&self) -> Result<EnrollmentTicket, DeviceError> {
        let ticket = self
            .client
            .start_binding()
            .await
            .map_err(self.fail(enroll))?;
        let handle = MonitorHandle::new(ticket.monitor).ok_or_else(|| DeviceError::Enroll {
            address: self.address.clone(),
            reason: "device returned an empty monitor location".into(),
        })?;
        Ok(EnrollmentTicket {
            handle,
            user_code: ticket.user_code,
        })
    }

    async fn poll_status(&self, handle: &MonitorHandle) -> Result<BindStatus, DeviceError> {
        // Monitoring can outlive the session; log in again once.
        let task = match self.client.binding_task(handle.as_str()).await {
            Err(err) if err.is_auth_expired() => {
                debug!(rsc = %self.address, "session expired, logging in again");
                self.client.login().await.map_err(self.fail(poll))?;
                self.client.binding_task(handle.as_str()).await
            }
            other => other,
        }
        .map_err(self.fail(poll))?;
        Ok(match task.phase() {
            TaskPhase::Running => BindStatus::InProgress,
            TaskPhase::Completed => BindStatus::Success,
            TaskPhase::Failed => BindStatus::Error,
        })
    }

    async fn cancel_enrollment(&self, handle: &MonitorHandle) -> Result<(), DeviceError> {
        self.client
            .cancel_binding(handle.as_str())
            .await
            .map_err(self.fail(cancel))
    }
}
