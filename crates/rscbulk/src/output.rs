//! Output formatting for the final per-RSC report: table, JSON, plain.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use rscbulk_core::{DeviceReport, TaskState};

use crate::cli::OutputFormat;
use crate::error::CliError;

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "RSC")]
    address: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "User code")]
    user_code: String,
    #[tabled(rename = "Password")]
    password: String,
}

/// Color only when writing to a terminal and `NO_COLOR` is unset.
fn should_color() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn paint_state(state: &TaskState, color: bool) -> String {
    let label = state.to_string();
    if !color {
        return label;
    }
    match state {
        TaskState::Success | TaskState::AlreadyEnrolled => label.green().to_string(),
        TaskState::Error => label.red().to_string(),
        TaskState::Cancelled | TaskState::InProgress(_) => label.yellow().to_string(),
        TaskState::NotStarted => label.dimmed().to_string(),
    }
}

pub fn render_report(
    format: OutputFormat,
    report: &[DeviceReport],
    color: bool,
) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::Table => {
            let rows: Vec<ReportRow> = report
                .iter()
                .map(|r| ReportRow {
                    address: r.address.clone(),
                    state: paint_state(&r.state, color),
                    user_code: r.user_code.clone().unwrap_or_default(),
                    password: if r.password_changed { "changed".into() } else { String::new() },
                })
                .collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).map_err(|e| CliError::Internal {
                message: format!("cannot serialize report: {e}"),
            })?
        }
        OutputFormat::Plain => report
            .iter()
            .map(|r| format!("{} {}", r.address, r.state))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(rendered)
}

pub fn print_report(format: OutputFormat, report: &[DeviceReport]) -> Result<(), CliError> {
    print_line(&render_report(format, report, should_color())?);
    Ok(())
}

/// Progress lines for password rotations done while preparing the batch.
pub fn password_lines(report: &[DeviceReport]) -> Vec<String> {
    report
        .iter()
        .filter(|r| r.password_changed)
        .map(|r| format!("Changed password for RSC '{}'", r.address))
        .collect()
}

/// One line per device the interrupt reached.
pub fn cancel_lines(report: &[DeviceReport]) -> Vec<String> {
    report
        .iter()
        .filter(|r| r.state == TaskState::Cancelled)
        .map(|r| match r.cancel_error {
            None => format!("Enrollment cancelled for RSC '{}'", r.address),
            Some(ref err) => format!(
                "Could not cancel enrollment for RSC '{}', cancel it in the cloud console: {err}",
                r.address
            ),
        })
        .collect()
}

/// Print one operator-facing line to stdout.
pub fn print_line(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
