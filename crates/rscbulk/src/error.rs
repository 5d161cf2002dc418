//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use rscbulk_config::ConfigError;
use rscbulk_core::{CoreError, PasswordChangeReport, ValidationReport};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("No RSCs given")]
    #[diagnostic(
        code(rscbulk::no_input),
        help(
            "Pass a device list with --csv <PATH> or entries with \
             --inline <ADDR,PASSWORD[,NEW_PASSWORD]>.\n\
             Run: rscbulk --examples"
        )
    )]
    NoInput,

    #[error("Error in line {line} ('{content}'): {reason}")]
    #[diagnostic(
        code(rscbulk::import),
        help("Each line needs: address,current_password[,new_password]")
    )]
    Import {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("Cannot read device list {path}")]
    #[diagnostic(code(rscbulk::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── Discovery ────────────────────────────────────────────────────
    #[error("No RSCs discovered")]
    #[diagnostic(
        code(rscbulk::nothing_discovered),
        help("Is a firewall blocking mDNS (UDP port 5353)?")
    )]
    NothingDiscovered,

    #[error("RSC discovery failed")]
    #[diagnostic(
        code(rscbulk::discovery),
        help(
            "{reason}\n\
             Discovery needs multicast on UDP port 5353."
        )
    )]
    Discovery { reason: String },

    // ── Credentials ──────────────────────────────────────────────────
    #[error("Credential validation failed for {failed} of {checked} RSC(s)")]
    #[diagnostic(
        code(rscbulk::validation),
        help(
            "{details}\n\
             Nothing was changed on any RSC. Fix the passwords in the device list \
             and try again."
        )
    )]
    ValidationFailed {
        failed: usize,
        checked: usize,
        details: String,
    },

    #[error("Interrupted after checking {checked} of {total} RSC(s)")]
    #[diagnostic(
        code(rscbulk::interrupted),
        help("Nothing was changed on any RSC.")
    )]
    ValidationInterrupted { checked: usize, total: usize },

    #[error("Password change failed for {failed} of {total} RSC(s)")]
    #[diagnostic(code(rscbulk::password_change), help("{details}"))]
    PasswordChange {
        failed: usize,
        total: usize,
        details: String,
    },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Cannot set up a connection to RSC '{address}'")]
    #[diagnostic(
        code(rscbulk::client),
        help(
            "{reason}\n\
             Check the address and, if set, the --ca-cert path."
        )
    )]
    Client { address: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(rscbulk::config),
        help("Check the config file and RSCBULK_* environment variables.")
    )]
    Config(#[from] ConfigError),

    // ── Internal ─────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(rscbulk::internal))]
    Internal { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn validation(report: &ValidationReport) -> Self {
        let details = report
            .issues()
            .iter()
            .map(|issue| format!("{}: {}", issue.address, issue.problem))
            .collect::<Vec<_>>()
            .join("\n");
        Self::ValidationFailed {
            failed: report.issues().len(),
            checked: report.checked(),
            details,
        }
    }

    pub fn password_change(report: &PasswordChangeReport) -> Self {
        let details = report
            .failed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        Self::PasswordChange {
            failed: report.failed.len(),
            total: report.failed.len() + report.changed.len(),
            details,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { report } => CliError::validation(&report),

            CoreError::Import {
                line,
                content,
                reason,
            } => CliError::Import {
                line,
                content,
                reason,
            },

            CoreError::Io { path, source } => CliError::Io {
                path: path.display().to_string(),
                source,
            },

            CoreError::Client { address, reason } => CliError::Client { address, reason },

            CoreError::Discovery { reason } => CliError::Discovery { reason },

            err @ CoreError::NotMonitorable { .. } => CliError::Internal {
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_usage_errors() {
        let err = CliError::from(ConfigError::Validation {
            field: "poll_interval_secs".into(),
            reason: "must be at least 1".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert_eq!(CliError::NoInput.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn import_error_keeps_line() {
        let err = CliError::from(CoreError::Import {
            line: 3,
            content: "10.0.0.2".into(),
            reason: "need to have at least address and current password".into(),
        });
        assert!(err.to_string().starts_with("Error in line 3 ('10.0.0.2')"));
    }

    #[test]
    fn empty_discovery_is_a_general_failure() {
        assert_eq!(CliError::NothingDiscovered.exit_code(), exit_code::GENERAL);
        let err = CliError::from(CoreError::Discovery {
            reason: "no multicast interface".into(),
        });
        assert!(matches!(err, CliError::Discovery { ref reason } if reason.contains("multicast")));
    }
}
