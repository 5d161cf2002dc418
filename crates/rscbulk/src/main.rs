mod cli;
mod config;
mod error;
mod output;

use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use rscbulk_core::{
    BulkEnroller, Enrollment, MonitorOutcome, RscDevice, change_passwords, connect_all, discover,
    import_devices, validate_credentials,
};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if cli.examples {
        output::print_line(cli::EXAMPLES.trim_end());
        return Ok(());
    }
    if cli.discover {
        let settings = config::resolve(&cli)?;
        return discover_only(settings.discovery_window).await;
    }
    if !cli.has_input() {
        return Err(CliError::NoInput);
    }

    let settings = config::resolve(&cli)?;
    let entries = import_devices(cli.csv.as_deref(), &cli.inline)?;
    if entries.is_empty() {
        return Err(CliError::NoInput);
    }
    tracing::info!(count = entries.len(), "RSCs imported");
    let records = connect_all(entries, &settings.connection)?;

    if cli.change_password {
        return change_password_only(&records).await;
    }

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    if cli.validate_only {
        return validate_only(&records, &cancel).await;
    }

    let mut enroller = BulkEnroller::new(records, settings.enroll);
    let started = enroller.start(&cancel).await?;
    for line in output::password_lines(&enroller.report()) {
        output::print_line(&line);
    }
    if let Some(ref link) = started.link {
        output::print_line(&format!("Activate the RSCs in the cloud console:\n{link}"));
    }
    if started.queued > 0 {
        output::print_line("Monitoring RSCs, press Ctrl+C to abort");
    }

    match enroller.monitor(&cancel).await? {
        MonitorOutcome::Completed => {}
        MonitorOutcome::Cancelled => {
            tracing::warn!("enrollment aborted by operator");
            for line in output::cancel_lines(&enroller.report()) {
                output::print_line(&line);
            }
        }
        MonitorOutcome::PassLimitReached => {
            tracing::warn!("stopped monitoring, some RSCs are still in progress");
        }
    }

    output::print_report(cli.output, &enroller.report())
}

async fn discover_only(window: Duration) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    output::print_line(&format!(
        "Looking for RSCs for {} second(s)...",
        window.as_secs()
    ));
    let found = discover(window, &cancel).await?;
    if found.is_empty() {
        return Err(CliError::NothingDiscovered);
    }
    output::print_line("Discovered the following RSCs:");
    for address in &found {
        output::print_line(address);
    }
    Ok(())
}

async fn validate_only(
    records: &[Enrollment<RscDevice>],
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let report = validate_credentials(records, cancel).await;
    if report.interrupted() {
        return Err(CliError::ValidationInterrupted {
            checked: report.checked(),
            total: records.len(),
        });
    }
    if report.is_clean() {
        output::print_line(&format!(
            "Credentials valid for all {} RSC(s)",
            report.checked()
        ));
        Ok(())
    } else {
        Err(CliError::validation(&report))
    }
}

async fn change_password_only(records: &[Enrollment<RscDevice>]) -> Result<(), CliError> {
    let report = change_passwords(records).await;
    for address in &report.changed {
        output::print_line(&format!("Password changed for {address}"));
    }
    if report.all_succeeded() {
        Ok(())
    } else {
        Err(CliError::password_change(&report))
    }
}

/// Cancel `token` on the first Ctrl+C. The handler stays installed, so a
/// second Ctrl+C cannot kill the process while cancel requests go out.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            output::print_line("Interrupted, stopping...");
            token.cancel();
        }
    });
}
