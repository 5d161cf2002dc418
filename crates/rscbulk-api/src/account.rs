// Account and network settings endpoints

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::RscClient;
use crate::error::Error;
use crate::models::{CloudAccess, PasswordChange, PasswordStatus};

const PASSWORD_PATH: &str = "/api/v1/account/password";
const CLOUD_ACCESS_PATH: &str = "/api/v1/network/cloud-access";

impl RscClient {
    /// Whether the account still runs on a password that must be changed
    /// (factory default or expired).
    pub async fn password_change_required(&self) -> Result<bool, Error> {
        let status: PasswordStatus = self.get(self.api_url(PASSWORD_PATH)?).await?;
        Ok(status.change_required)
    }

    /// Replace the account password. On success the client switches to the
    /// new password for subsequent logins; the current session is kept.
    pub async fn change_password(&self, new_password: &SecretString) -> Result<(), Error> {
        let old = self.current_password();
        let body = PasswordChange {
            old_password: old.expose_secret(),
            new_password: new_password.expose_secret(),
        };
        self.send(Method::PUT, self.api_url(PASSWORD_PATH)?, Some(&body))
            .await?;
        self.replace_password(new_password.clone());
        debug!("password changed");
        Ok(())
    }

    /// Apply proxy and/or NTP settings used for cloud access.
    pub async fn set_cloud_access(&self, settings: &CloudAccess) -> Result<(), Error> {
        self.send(Method::PUT, self.api_url(CLOUD_ACCESS_PATH)?, Some(settings))
            .await?;
        debug!(?settings, "cloud access settings applied");
        Ok(())
    }
}
