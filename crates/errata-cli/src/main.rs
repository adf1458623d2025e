// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod commands;
mod report;
mod transfer_log;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use commands::{run_audit, run_reconcile, AuditArgs, CliFailure, ReconcileArgs};
use errata_core::{ExitCode, Scope};
use errata_platform::HttpPlatform;
use report::ReportFormat;
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "errata")]
#[command(about = "Audits error-tagged containers and reconciles transfer logs")]
struct Cli {
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-validate flagged containers and write a resolution report.
    Audit {
        #[arg(long)]
        api_url: String,
        #[arg(long, env = "ERRATA_API_KEY", hide_env_values = true)]
        api_key: String,
        /// Audit the subtree under this container.
        #[arg(long)]
        parent: Option<String>,
        /// Resolve an analysis destination and audit under its parent.
        #[arg(long, conflicts_with = "parent")]
        destination: Option<String>,
        #[arg(long, value_enum, default_value_t = ScopeCli::All)]
        scope: ScopeCli,
        #[arg(long, value_enum)]
        format: Option<FormatCli>,
        /// Report filename; defaults to `<parent label>-<timestamp>.<ext>`.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Delete each error log (and the error tag) once it fully resolves.
        #[arg(long, default_value_t = false)]
        delete_error_logs: bool,
        /// Report only; skip tag removal, file deletion and label updates.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Compare a project's sessions against an external transfer log.
    Reconcile {
        #[arg(long)]
        api_url: String,
        #[arg(long, env = "ERRATA_API_KEY", hide_env_values = true)]
        api_key: String,
        #[arg(long)]
        parent: String,
        #[arg(long)]
        transfer_log: PathBuf,
        #[arg(long, default_value = "MR")]
        modality: String,
        #[arg(long, value_enum)]
        format: Option<FormatCli>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScopeCli {
    All,
    Subject,
    Session,
    Acquisition,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatCli {
    Csv,
    Json,
}

fn main() -> ProcessExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli.command) {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(failure) => {
            error!("{}", failure.message);
            ProcessExitCode::from(failure.exit as u8)
        }
    }
}

fn run(command: Commands) -> Result<(), CliFailure> {
    match command {
        Commands::Audit {
            api_url,
            api_key,
            parent,
            destination,
            scope,
            format,
            output,
            delete_error_logs,
            dry_run,
        } => {
            let platform = HttpPlatform::new(api_url, api_key);
            run_audit(
                &platform,
                &AuditArgs {
                    parent,
                    destination,
                    scope: scope.into(),
                    format: format.map(ReportFormat::from),
                    output,
                    delete_error_logs,
                    dry_run,
                },
            )
        }
        Commands::Reconcile {
            api_url,
            api_key,
            parent,
            transfer_log,
            modality,
            format,
            output,
        } => {
            let platform = HttpPlatform::new(api_url, api_key);
            run_reconcile(
                &platform,
                &ReconcileArgs {
                    parent,
                    transfer_log,
                    modality,
                    format: format.map(ReportFormat::from),
                    output,
                },
            )
        }
    }
}

impl From<ScopeCli> for Scope {
    fn from(value: ScopeCli) -> Self {
        match value {
            ScopeCli::All => Self::All,
            ScopeCli::Subject => Self::Subject,
            ScopeCli::Session => Self::Session,
            ScopeCli::Acquisition => Self::Acquisition,
        }
    }
}

impl From<FormatCli> for ReportFormat {
    fn from(value: FormatCli) -> Self {
        match value {
            FormatCli::Csv => Self::Csv,
            FormatCli::Json => Self::Json,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("ERRATA_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
