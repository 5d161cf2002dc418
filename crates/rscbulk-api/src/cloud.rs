// Cloud binding endpoints
//
// Starting a binding creates a task on the device; its monitor location
// is polled until the task leaves the running phase and deleted to cancel.

use reqwest::Method;
use reqwest::header::LOCATION;
use tracing::debug;

use crate::client::{RscClient, decode_str};
use crate::error::Error;
use crate::models::{BindingStartedBody, BindingStatus, BindingTicket, TaskMonitor};

const BINDING_PATH: &str = "/api/v1/cloud/binding";

impl RscClient {
    /// Whether the device is already bound to the cloud service.
    pub async fn is_bound(&self) -> Result<bool, Error> {
        let status: BindingStatus = self.get(self.api_url(BINDING_PATH)?).await?;
        Ok(status.bound)
    }

    /// Start a cloud binding task.
    ///
    /// The monitor location comes from the `Location` header, falling back
    /// to the `monitor` field of the body. A reply with neither is an error.
    pub async fn start_binding(&self) -> Result<BindingTicket, Error> {
        let resp = self
            .send(Method::POST, self.api_url(BINDING_PATH)?, None::<&()>)
            .await?;

        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let text = resp.text().await?;
        let body: BindingStartedBody = if text.trim().is_empty() {
            BindingStartedBody::default()
        } else {
            decode_str(text)?
        };

        let monitor = location
            .or(body.monitor)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                Error::UnexpectedResponse("binding started without a monitor location".into())
            })?;
        let user_code = body.user_code.filter(|c| !c.is_empty());

        debug!(%monitor, has_code = user_code.is_some(), "binding started");
        Ok(BindingTicket { monitor, user_code })
    }

    /// Fetch the binding task monitor.
    pub async fn binding_task(&self, monitor: &str) -> Result<TaskMonitor, Error> {
        self.get(self.monitor_url(monitor)?).await
    }

    /// Cancel a running binding task.
    pub async fn cancel_binding(&self, monitor: &str) -> Result<(), Error> {
        self.send(Method::DELETE, self.monitor_url(monitor)?, None::<&()>)
            .await?;
        debug!(%monitor, "binding cancelled");
        Ok(())
    }
}
