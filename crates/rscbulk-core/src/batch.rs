// ── Batch orchestrator ──
//
// Owns the enrollment records of one run and drives them through
// validation, preparation, initiation, code aggregation and monitoring.
// Split into `start` and `monitor` so the caller can show the activation
// link in between.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::EnrollConfig;
use crate::credentials::{ValidationReport, validate_credentials};
use crate::device::Device;
use crate::enroll::{MonitorOutcome, aggregate_codes, enroll_all, monitor};
use crate::error::CoreError;
use crate::model::{Enrollment, TaskState};

/// What `start` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Started {
    /// Activation link for every issued code, if any was issued.
    pub link: Option<String>,
    /// Devices now waiting for the operator to activate them.
    pub queued: usize,
}

/// Final state of one device, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceReport {
    pub address: String,
    pub state: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_code: Option<String>,
    /// The device now uses the new password from the device list.
    pub password_changed: bool,
    /// The device refused the cancel request after an interrupt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_error: Option<String>,
}

pub struct BulkEnroller<D> {
    records: Vec<Enrollment<D>>,
    config: EnrollConfig,
    queued: Vec<usize>,
}

impl<D: Device> BulkEnroller<D> {
    pub fn new(records: Vec<Enrollment<D>>, config: EnrollConfig) -> Self {
        Self {
            records,
            config,
            queued: Vec::new(),
        }
    }

    /// Check every device's credentials without changing anything.
    pub async fn validate(&self, cancel: &CancellationToken) -> ValidationReport {
        validate_credentials(&self.records, cancel).await
    }

    /// Validate, then prepare and start enrollment on every device.
    ///
    /// Refuses with [`CoreError::Validation`] before touching any device
    /// when a credential problem is found. An interrupt during validation
    /// ends the run with nothing started. When no device returned an
    /// activation code, the started devices are marked failed and nothing
    /// is left to monitor.
    pub async fn start(&mut self, cancel: &CancellationToken) -> Result<Started, CoreError> {
        let report = self.validate(cancel).await;
        if report.interrupted() {
            warn!(checked = report.checked(), "interrupted before enrollment was started");
            return Ok(Started {
                link: None,
                queued: 0,
            });
        }
        if !report.is_clean() {
            return Err(CoreError::Validation { report });
        }

        self.queued = enroll_all(&mut self.records, &self.config, cancel).await;
        info!(queued = self.queued.len(), total = self.records.len(), "enrollment started");

        let base = self.config.verification_uri.clone();
        let link = aggregate_codes(&base, &mut self.queued_mut());
        if link.is_none() {
            self.queued.clear();
        }

        Ok(Started {
            link,
            queued: self.queued.len(),
        })
    }

    /// Poll the started devices until they finish or `cancel` fires.
    pub async fn monitor(&mut self, cancel: &CancellationToken) -> Result<MonitorOutcome, CoreError> {
        let options = self.config.monitor.clone();
        let mut queued = self.queued_mut();
        monitor(&mut queued, &options, cancel).await
    }

    /// One line per device with its final state.
    pub fn report(&self) -> Vec<DeviceReport> {
        self.records
            .iter()
            .map(|e| DeviceReport {
                address: e.address().to_owned(),
                state: e.state().clone(),
                user_code: e.user_code().map(str::to_owned),
                password_changed: e.password_changed(),
                cancel_error: e.cancel_error().map(str::to_owned),
            })
            .collect()
    }

    fn queued_mut(&mut self) -> Vec<&mut Enrollment<D>> {
        let queued = &self.queued;
        self.records
            .iter_mut()
            .enumerate()
            .filter(|(idx, _)| queued.contains(idx))
            .map(|(_, e)| e)
            .collect()
    }
}
