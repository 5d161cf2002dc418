//! Resolution of the effective settings: config file + env, then CLI flags.

use std::time::Duration;

use rscbulk_config::Config;
use rscbulk_core::{ConnectionConfig, EnrollConfig};

use crate::cli::Cli;
use crate::error::CliError;

/// Everything a run needs besides the device list.
#[derive(Debug)]
pub struct Settings {
    pub connection: ConnectionConfig,
    pub enroll: EnrollConfig,
    pub discovery_window: Duration,
}

pub fn resolve(cli: &Cli) -> Result<Settings, CliError> {
    let mut cfg = rscbulk_config::load_config()?;
    apply_overrides(&mut cfg, cli);
    cfg.validate()?;
    tracing::debug!(config = %rscbulk_config::config_path().display(), "settings resolved");

    Ok(Settings {
        connection: cfg.connection_config(),
        enroll: cfg.enroll_config(),
        discovery_window: cfg.discovery_window(),
    })
}

/// CLI flags win over the file.
fn apply_overrides(cfg: &mut Config, cli: &Cli) {
    if let Some(ref username) = cli.username {
        cfg.username.clone_from(username);
    }
    if let Some(timeout) = cli.timeout {
        cfg.timeout_secs = timeout;
    }
    if let Some(interval) = cli.poll_interval {
        cfg.poll_interval_secs = interval;
    }
    if cli.max_passes.is_some() {
        cfg.max_passes = cli.max_passes;
    }
    if cli.proxy.is_some() {
        cfg.proxy.clone_from(&cli.proxy);
    }
    if cli.ntp.is_some() {
        cfg.ntp.clone_from(&cli.ntp);
    }
    if cli.insecure {
        cfg.insecure = true;
        cfg.ca_cert = None;
    }
    if cli.ca_cert.is_some() {
        cfg.ca_cert.clone_from(&cli.ca_cert);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use rscbulk_core::TlsVerification;

    use super::*;

    fn overridden(args: &[&str]) -> Config {
        let cli = Cli::try_parse_from(args).expect("valid arguments");
        let mut cfg = Config {
            ca_cert: Some(PathBuf::from("/etc/rsc/ca.pem")),
            ..Config::default()
        };
        apply_overrides(&mut cfg, &cli);
        cfg
    }

    #[test]
    fn flags_override_file_values() {
        let cfg = overridden(&[
            "rscbulk",
            "-c",
            "rscs.csv",
            "--username",
            "operator",
            "--proxy",
            "http://proxy:3128",
            "--max-passes",
            "10",
        ]);
        assert_eq!(cfg.username, "operator");
        assert_eq!(cfg.proxy.as_deref(), Some("http://proxy:3128"));
        assert_eq!(cfg.max_passes, Some(10));
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn insecure_flag_drops_configured_ca() {
        let cfg = overridden(&["rscbulk", "-c", "rscs.csv", "-k"]);
        assert_eq!(cfg.tls(), TlsVerification::DangerAcceptInvalid);
    }
}
