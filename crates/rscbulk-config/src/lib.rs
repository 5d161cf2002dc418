//! Configuration for the rscbulk CLI.
//!
//! Built-in defaults, overlaid by `config.toml` in the platform config
//! directory, overlaid by `RSCBULK_*` environment variables. Translates the
//! result into the `rscbulk_core` connection and enrollment settings;
//! command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rscbulk_core::{
    ConnectionConfig, DEFAULT_DISCOVERY_WINDOW, DEFAULT_VERIFICATION_URI, EnrollConfig,
    MonitorOptions, NetworkSettings, TlsVerification,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Management account on every RSC.
    pub username: String,

    /// Activation page; user codes are appended comma-separated.
    pub verification_uri: String,

    /// Seconds between two monitor passes.
    pub poll_interval_secs: u64,

    /// Seconds to wait after pushing proxy/NTP settings.
    pub settle_delay_secs: u64,

    /// Give up monitoring after this many passes.
    pub max_passes: Option<u32>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Accept self-signed certificates (RSC factory default).
    pub insecure: bool,

    /// Path to a custom CA certificate. Takes precedence over `insecure`.
    pub ca_cert: Option<PathBuf>,

    /// Default proxy pushed to every RSC.
    pub proxy: Option<String>,

    /// Default NTP server pushed to every RSC.
    pub ntp: Option<String>,

    /// Seconds to listen for mDNS advertisements in discovery mode.
    pub discovery_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: "admin".into(),
            verification_uri: DEFAULT_VERIFICATION_URI.into(),
            poll_interval_secs: 5,
            settle_delay_secs: 2,
            max_passes: None,
            timeout_secs: 30,
            insecure: true,
            ca_cert: None,
            proxy: None,
            ntp: None,
            discovery_secs: DEFAULT_DISCOVERY_WINDOW.as_secs(),
        }
    }
}

impl Config {
    /// Reject values the orchestrator cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(invalid("username", "must not be empty"));
        }
        if self.verification_uri.trim().is_empty() {
            return Err(invalid("verification_uri", "must not be empty"));
        }
        if self.poll_interval_secs == 0 {
            return Err(invalid("poll_interval_secs", "must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be at least 1"));
        }
        if self.discovery_secs == 0 {
            return Err(invalid("discovery_secs", "must be at least 1"));
        }
        Ok(())
    }

    pub fn tls(&self) -> TlsVerification {
        match (&self.ca_cert, self.insecure) {
            (Some(path), _) => TlsVerification::CustomCa(path.clone()),
            (None, true) => TlsVerification::DangerAcceptInvalid,
            (None, false) => TlsVerification::SystemDefaults,
        }
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            username: self.username.clone(),
            tls: self.tls(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn discovery_window(&self) -> Duration {
        Duration::from_secs(self.discovery_secs)
    }

    pub fn enroll_config(&self) -> EnrollConfig {
        EnrollConfig {
            network: NetworkSettings::new(self.proxy.clone(), self.ntp.clone()),
            settle_delay: Duration::from_secs(self.settle_delay_secs),
            verification_uri: self.verification_uri.clone(),
            monitor: MonitorOptions {
                poll_interval: Duration::from_secs(self.poll_interval_secs),
                max_passes: self.max_passes,
            },
        }
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "rscbulk", "rscbulk").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("rscbulk");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment. A missing file is not an
/// error; the defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("RSCBULK_"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.username, "admin");
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.discovery_window(), Duration::from_secs(5));
        assert_eq!(config.tls(), TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "username = \"operator\"").unwrap();
        writeln!(file, "poll_interval_secs = 10").unwrap();
        writeln!(file, "max_passes = 120").unwrap();
        writeln!(file, "ntp = \"pool.ntp.org\"").unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.username, "operator");
        assert_eq!(config.settle_delay_secs, 2);

        let enroll = config.enroll_config();
        assert_eq!(enroll.monitor.poll_interval, Duration::from_secs(10));
        assert_eq!(enroll.monitor.max_passes, Some(120));
        assert_eq!(enroll.network.ntp.as_deref(), Some("pool.ntp.org"));
        assert!(enroll.network.proxy.is_none());
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_secs = 0").unwrap();
        let err = load_config_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "poll_interval_secs"));
    }

    #[test]
    fn ca_cert_wins_over_insecure() {
        let config = Config {
            ca_cert: Some(PathBuf::from("/etc/rsc/ca.pem")),
            ..Config::default()
        };
        assert_eq!(
            config.tls(),
            TlsVerification::CustomCa(PathBuf::from("/etc/rsc/ca.pem"))
        );
        let strict = Config {
            insecure: false,
            ..Config::default()
        };
        assert_eq!(strict.connection_config().tls, TlsVerification::SystemDefaults);
    }
}
