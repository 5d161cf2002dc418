//! Bulk cloud enrollment for fleets of RSCs (remote system controllers).
//!
//! This crate owns the orchestration logic on top of `rscbulk-api`:
//!
//! - **[`Device`]**: The capability the orchestrator needs from one RSC.
//!   [`RscDevice`] implements it over HTTPS; tests script their own.
//!
//! - **[`BulkEnroller`]**: Runs one batch: credential validation, the
//!   preparation pipeline (login, password rotation, proxy/NTP), enrollment
//!   initiation, activation link aggregation and the monitor loop.
//!
//! - **Task state** ([`TaskState`]): Per-device lifecycle. `InProgress`
//!   carries its [`MonitorHandle`]; terminal states never change.
//!
//! - **Import** ([`import_devices`]): Device lists from CSV files and
//!   inline items.
//!
//! - **Discovery** ([`discover`]): RSCs advertising themselves over mDNS.
//!
//! Per-device failures are [`DeviceError`]s: logged, and the device drops out
//! of later stages while the rest of the batch carries on. Batch-level
//! problems are [`CoreError`]s.

pub mod batch;
pub mod config;
pub mod credentials;
pub mod device;
pub mod discover;
pub mod enroll;
pub mod error;
pub mod import;
pub mod model;
pub mod rsc;

#[cfg(test)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use batch::{BulkEnroller, DeviceReport, Started};
pub use config::{
    ConnectionConfig, DEFAULT_VERIFICATION_URI, EnrollConfig, MonitorOptions, TlsVerification,
};
pub use credentials::{
    PasswordChangeReport, ValidationIssue, ValidationProblem, ValidationReport, change_passwords,
    validate_credentials,
};
pub use device::{Device, EnrollmentTicket};
pub use discover::{DEFAULT_DISCOVERY_WINDOW, discover};
pub use enroll::MonitorOutcome;
pub use error::{CoreError, DeviceError};
pub use import::{import_devices, parse_device_list};
pub use model::{BindStatus, DeviceEntry, Enrollment, MonitorHandle, NetworkSettings, TaskState};
pub use rsc::{RscDevice, connect_all};
