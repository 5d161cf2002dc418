// Wire types for the RSC management API.
//
// Request bodies serialize with snake_case keys; the task monitor
// resource uses Redfish-style PascalCase keys.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Reply of `GET /api/v1/account/password`.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordStatus {
    /// Set while the account still uses the factory default password.
    #[serde(default)]
    pub change_required: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct PasswordChange<'a> {
    pub old_password: &'a str,
    pub new_password: &'a str,
}

/// Body of `PUT /api/v1/network/cloud-access`. Unset fields are left
/// untouched on the device.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CloudAccess {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntp: Option<String>,
}

/// Reply of `GET /api/v1/cloud/binding`.
#[derive(Debug, Clone, Deserialize)]
pub struct BindingStatus {
    #[serde(default)]
    pub bound: bool,
}

/// Body of the `POST /api/v1/cloud/binding` reply. The monitor location
/// normally arrives in the `Location` header; `monitor` is the fallback.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BindingStartedBody {
    #[serde(default)]
    pub user_code: Option<String>,
    #[serde(default)]
    pub monitor: Option<String>,
}

/// A freshly started cloud binding task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTicket {
    /// Path (or absolute URL) of the task monitor resource.
    pub monitor: String,
    /// Activation code to paste into the cloud console, when one was issued.
    pub user_code: Option<String>,
}

/// Task monitor resource returned while polling a binding task.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskMonitor {
    #[serde(rename = "TaskState")]
    pub task_state: String,
    #[serde(rename = "TaskStatus", default)]
    pub task_status: Option<String>,
}

/// Coarse phase of a binding task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    Running,
    Completed,
    Failed,
}

impl TaskMonitor {
    pub fn phase(&self) -> TaskPhase {
        match self.task_state.as_str() {
            "New" | "Starting" | "Running" | "Pending" | "Suspended" | "Interrupted"
            | "Stopping" | "Service" => TaskPhase::Running,
            "Completed" => match self.task_status.as_deref() {
                None | Some("OK") => TaskPhase::Completed,
                Some(_) => TaskPhase::Failed,
            },
            _ => TaskPhase::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(state: &str, status: Option<&str>) -> TaskMonitor {
        TaskMonitor {
            task_state: state.into(),
            task_status: status.map(String::from),
        }
    }

    #[test]
    fn running_states_stay_running() {
        for state in ["New", "Starting", "Running", "Pending", "Suspended"] {
            assert_eq!(monitor(state, None).phase(), TaskPhase::Running, "{state}");
        }
    }

    #[test]
    fn completed_needs_ok_status() {
        assert_eq!(monitor("Completed", Some("OK")).phase(), TaskPhase::Completed);
        assert_eq!(monitor("Completed", None).phase(), TaskPhase::Completed);
        assert_eq!(monitor("Completed", Some("Critical")).phase(), TaskPhase::Failed);
    }

    #[test]
    fn exception_and_killed_fail() {
        assert_eq!(monitor("Exception", None).phase(), TaskPhase::Failed);
        assert_eq!(monitor("Killed", Some("Warning")).phase(), TaskPhase::Failed);
        assert_eq!(monitor("Cancelled", None).phase(), TaskPhase::Failed);
    }

    #[test]
    fn cloud_access_skips_unset_fields() {
        let body = CloudAccess {
            proxy: None,
            ntp: Some("pool.ntp.org".into()),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap_or_default(),
            serde_json::json!({ "ntp": "pool.ntp.org" })
        );
    }
}
