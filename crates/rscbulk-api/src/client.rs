// RSC HTTP client
//
// Wraps `reqwest::Client` with RSC-specific URL construction, CSRF token
// handling and reply checking. Endpoint groups (session, account, cloud)
// are implemented as inherent methods in separate files to keep this
// module focused on transport mechanics.

use std::sync::RwLock;

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Default management account on an RSC.
pub const DEFAULT_USERNAME: &str = "admin";

/// HTTP client for one RSC's management API.
///
/// Holds the session cookie (through the client's jar), the CSRF token
/// handed out at login, and the account password currently in force.
/// The password is swapped after a successful rotation so the next login
/// uses the new credential.
pub struct RscClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: RwLock<SecretString>,
    /// Required on all mutating requests. Captured from login response
    /// headers and rotated via `X-Updated-CSRF-Token`.
    csrf_token: RwLock<Option<String>>,
}

impl RscClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (session auth requires cookies).
    pub fn new(
        base_url: Url,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self::with_client(http, base_url, username, password))
    }

    /// Create a client for `https://{address}`.
    pub fn for_address(
        address: &str,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(&format!("https://{address}"))?;
        Self::new(base_url, username, password, transport)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            username: username.into(),
            password: RwLock::new(password),
            csrf_token: RwLock::new(None),
        }
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Copy of the password currently in force.
    pub(crate) fn current_password(&self) -> SecretString {
        let guard = self.password.read().expect("password lock poisoned");
        SecretString::from(guard.expose_secret().to_owned())
    }

    pub(crate) fn replace_password(&self, password: SecretString) {
        *self.password.write().expect("password lock poisoned") = password;
    }

    // ── CSRF token management ─────────────────────────────────────────

    pub(crate) fn set_csrf_token(&self, token: String) {
        debug!("storing CSRF token");
        *self.csrf_token.write().expect("CSRF lock poisoned") = Some(token);
    }

    fn update_csrf_from_response(&self, headers: &reqwest::header::HeaderMap) {
        let new_token = headers
            .get("X-Updated-CSRF-Token")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        if let Some(token) = new_token {
            trace!("CSRF token rotated");
            *self.csrf_token.write().expect("CSRF lock poisoned") = Some(token);
        }
    }

    fn apply_csrf(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.csrf_token.read().expect("CSRF lock poisoned");
        match guard.as_deref() {
            Some(token) => builder.header("X-CSRF-Token", token),
            None => builder,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path, e.g. `api/v1/cloud/binding`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Resolve a monitor location, which may be a path or an absolute URL.
    pub(crate) fn monitor_url(&self, monitor: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(monitor)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        let resp = self.check(resp).await?;
        decode(resp).await
    }

    /// Send a mutating request with an optional JSON body.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<reqwest::Response, Error> {
        debug!("{} {}", method, url);
        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = self.apply_csrf(builder).send().await?;
        self.check(resp).await
    }

    /// Map non-success replies onto errors, keeping any CSRF rotation.
    async fn check(&self, resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        self.update_csrf_from_response(resp.headers());

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        Ok(resp)
    }
}

/// Decode a JSON body, keeping the raw text for diagnostics.
pub(crate) async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    decode_str(resp.text().await?)
}

pub(crate) fn decode_str<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
