//! Clap derive structures for the `rscbulk` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

pub const EXAMPLES: &str = "\
Examples:
  Enroll every RSC listed in a CSV file:
    rscbulk -c rscs.csv

  Enroll two RSCs given inline, the second one with a new password:
    rscbulk -i 192.168.0.67,123456789abcdef0! -i rsc-8DD123FFF,oldpw,newpw

  Only check that the credentials work:
    rscbulk -c rscs.csv --validate-only

  Only change the passwords (third CSV column):
    rscbulk -c rscs.csv --change-password

  Push proxy and NTP settings before enrolling:
    rscbulk -c rscs.csv --proxy http://proxy.example.com:3128 --ntp pool.ntp.org

  List the RSCs advertising themselves on the local network:
    rscbulk -d

CSV format, one RSC per line, comma separated:
  address,current_password[,new_password]
Quote a password that contains a comma: 10.0.0.1,\"pa,ss\"
";

/// rscbulk -- enroll fleets of RSCs into cloud management
#[derive(Debug, Parser)]
#[command(
    name = "rscbulk",
    version,
    about = "Bulk-enroll RSCs into cloud management",
    long_about = "Logs into every RSC, changes factory passwords where required, \
        optionally pushes proxy/NTP settings, starts cloud enrollment and prints \
        one activation link for the whole batch. Then monitors every RSC until \
        enrollment finishes or Ctrl+C is pressed.",
    after_long_help = EXAMPLES
)]
pub struct Cli {
    /// CSV file with one RSC per line: address,current_password[,new_password]
    #[arg(long, short = 'c', value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// RSC given on the command line (repeatable)
    #[arg(long, short = 'i', value_name = "ADDR,PASSWORD[,NEW_PASSWORD]", num_args = 1..)]
    pub inline: Vec<String>,

    /// Discover RSCs on the local network via mDNS, list them, then exit
    #[arg(
        long,
        short = 'd',
        conflicts_with_all = ["csv", "inline", "validate_only", "change_password"]
    )]
    pub discover: bool,

    /// Only validate the credentials of every RSC, then exit
    #[arg(long, short = 'p', conflicts_with = "change_password")]
    pub validate_only: bool,

    /// Only change the password of every RSC to its new password, then exit
    #[arg(long)]
    pub change_password: bool,

    /// Proxy to configure on every RSC before enrolling
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// NTP server to configure on every RSC before enrolling
    #[arg(long, value_name = "HOST")]
    pub ntp: Option<String>,

    /// Format of the final report
    #[arg(long, short = 'o', default_value = "table")]
    pub output: OutputFormat,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', conflicts_with = "ca_cert")]
    pub insecure: bool,

    /// Verify RSC certificates against this CA certificate
    #[arg(long, value_name = "PATH")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Management account name
    #[arg(long)]
    pub username: Option<String>,

    /// Seconds between two status checks while monitoring
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// Stop monitoring after this many status checks
    #[arg(long, value_name = "N")]
    pub max_passes: Option<u32>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Print usage examples and exit
    #[arg(long, short = 'e')]
    pub examples: bool,
}

impl Cli {
    pub fn has_input(&self) -> bool {
        self.csv.is_some() || !self.inline.is_empty()
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one RSC per line (scripting)
    Plain,
}
