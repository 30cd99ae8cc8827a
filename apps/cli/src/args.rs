use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Storage usage of a catalog deployment, per backend and per organization.
#[derive(Parser, Debug)]
#[command(name = "storage-admin")]
#[command(version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: $STORAGE_ADMIN_CONFIG, then ./storage-admin.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging for the storage crates. RUST_LOG still applies.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the usage API over HTTP
    Serve(ServeArgs),

    /// Compute one report and print it
    Report(ReportArgs),

    /// Write a commented config template
    Init,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address, overriding `server.bind`
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Usage per organization
    #[arg(long, conflicts_with_all = ["unattributed", "full"])]
    pub per_org: bool,

    /// Usage no organization could be charged for
    #[arg(long, conflicts_with = "full")]
    pub unattributed: bool,

    /// Global, per-organization and unattributed usage from one pass
    #[arg(long)]
    pub full: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_flags_parse() {
        let cli = Cli::try_parse_from([
            "storage-admin",
            "--config",
            "/etc/storage-admin.toml",
            "-v",
            "report",
            "--per-org",
            "--format",
            "json",
        ])
        .expect("args");

        assert_eq!(cli.config, Some(PathBuf::from("/etc/storage-admin.toml")));
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Report(report) => {
                assert!(report.per_org);
                assert!(!report.full);
                assert_eq!(report.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn report_views_are_exclusive() {
        let result = Cli::try_parse_from(["storage-admin", "report", "--per-org", "--full"]);
        assert!(result.is_err());
    }

    #[test]
    fn serve_accepts_a_bind_override() {
        let cli = Cli::try_parse_from(["storage-admin", "serve", "--bind", "0.0.0.0:8080"])
            .expect("args");
        match cli.command {
            Command::Serve(serve) => assert_eq!(serve.bind.as_deref(), Some("0.0.0.0:8080")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
