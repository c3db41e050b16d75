//! JrnMaint CLI - jrnmaint command

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli_lib::config::{parse_delete, parse_library, parse_output_mode, Settings};
use journal::{ExitStatus, ObjectName, OutputMode};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cmd;

/// JrnMaint - journal receiver maintenance for queue manager journals
#[derive(Parser)]
#[command(name = "jrnmaint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store root holding one directory per library
    #[arg(long, env = "JRNMAINT_ROOT", global = true)]
    root: Option<PathBuf>,

    /// Config file (default: <config dir>/jrnmaint/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log diagnostics at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report on, and optionally delete, receivers no longer needed for recovery
    Run {
        /// Queue manager library name (up to 10 characters)
        #[arg(value_parser = parse_library)]
        library: ObjectName,
        /// Where to send the report: *PRINT (default) or *MSGQ
        #[arg(value_name = "OUTPUT", value_parser = parse_output_mode)]
        output_pos: Option<OutputMode>,
        /// Delete receivers: *YES or *NO (default)
        #[arg(value_name = "DELETE", value_parser = parse_delete)]
        delete_pos: Option<bool>,
        /// Where to send the report: *PRINT or *MSGQ
        #[arg(long = "output", value_name = "OUTPUT", value_parser = parse_output_mode, conflicts_with = "output_pos")]
        output: Option<OutputMode>,
        /// Delete receivers older than the oldest one still needed: *YES or *NO
        #[arg(long = "delete", value_name = "DELETE", value_parser = parse_delete, conflicts_with = "delete_pos")]
        delete: Option<bool>,
    },
    /// List the receiver chain with keep/delete verdicts (never deletes)
    Chain {
        /// Queue manager library name
        #[arg(value_parser = parse_library)]
        library: ObjectName,
    },
    /// Show configuration
    Config {
        /// Print the default config file path
        #[arg(long)]
        path: bool,
        /// Print an example config file
        #[arg(long, conflicts_with = "path")]
        example: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(cli: Cli) -> Result<ExitStatus> {
    match cli.command {
        Commands::Config { path: true, .. } => cmd::config::run_path().map(|_| ExitStatus::Success),
        Commands::Config { example: true, .. } => cmd::config::run_example().map(|_| ExitStatus::Success),
        command => {
            let settings = Settings::load(cli.config.as_deref(), cli.root)?;
            match command {
                Commands::Run {
                    library,
                    output_pos,
                    delete_pos,
                    output,
                    delete,
                } => {
                    let output = output.or(output_pos).unwrap_or(OutputMode::Print);
                    let delete = delete.or(delete_pos).unwrap_or(false);
                    cmd::run::run(&settings, library, output, delete)
                }
                Commands::Chain { library } => cmd::chain::run(&settings, library),
                Commands::Config { .. } => cmd::config::run_show(&settings).map(|_| ExitStatus::Success),
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are reported through the same path
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(ExitStatus::InvalidArguments.code())
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.verbose);

    match dispatch(cli) {
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            eprintln!("{} {:#}", "ERROR:".red().bold(), e);
            ExitCode::from(ExitStatus::InvalidArguments.code())
        }
    }
}
