use thiserror::Error;

/// Top-level error type for the `rscbulk-api` crate.
///
/// Covers every failure mode of a single RSC conversation: authentication,
/// transport, TLS setup, non-success HTTP replies and malformed bodies.
/// `rscbulk-core` maps these into device-scoped errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or the session cookie is no longer accepted.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success reply from the device.
    #[error("RSC API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The device replied successfully but left out something we need.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the session was rejected and logging in again
    /// might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}
