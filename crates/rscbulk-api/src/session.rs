// Session authentication
//
// Cookie-based login. The login endpoint sets a session cookie in
// the client's jar; subsequent requests use that cookie automatically.

use secrecy::ExposeSecret;
use tracing::debug;

use crate::client::RscClient;
use crate::error::Error;
use crate::models::LoginRequest;

const SESSION_PATH: &str = "/api/v1/session";

impl RscClient {
    /// Log in with the configured username and the password in force.
    ///
    /// On success the session cookie is stored in the client's jar and the
    /// CSRF token, if the device issued one, is kept for mutating calls.
    pub async fn login(&self) -> Result<(), Error> {
        let url = self.api_url(SESSION_PATH)?;
        debug!("logging in at {}", url);

        let password = self.current_password();
        let body = LoginRequest {
            username: self.username(),
            password: password.expose_secret(),
        };

        let resp = self.http().post(url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", body.trim()),
            });
        }

        if let Some(token) = resp
            .headers()
            .get("X-CSRF-Token")
            .and_then(|v| v.to_str().ok())
        {
            self.set_csrf_token(token.to_owned());
        }

        debug!("login successful");
        Ok(())
    }
}
