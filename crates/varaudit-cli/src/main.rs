//! varaudit CLI - Command-line interface for varaudit
//!
//! Provides `varaudit audit`, which searches every group and project
//! reachable with the given token for a CI/CD variable whose value contains
//! a string.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use config::{AuditArgs, AuditConfig};

#[derive(Parser)]
#[command(name = "varaudit")]
#[command(about = "varaudit - GitLab CI/CD variable auditor")]
#[command(version)]
struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log every request
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search group and project variables for a value
    Audit(AuditArgs),
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match cli.command {
        Commands::Audit(args) => {
            if let Err(e) = run_audit(args) {
                eprintln!("Error: {e:#}");
                std::process::exit(1);
            }
        }
    }
}

fn init_logging(quiet: bool, verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // Connection pool chatter drowns out per-node progress.
    if !verbose {
        builder.filter_module("hyper_util", log::LevelFilter::Warn);
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn run_audit(args: AuditArgs) -> anyhow::Result<()> {
    let config = AuditConfig::from_args(args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(commands::audit::execute(&config))?;

    commands::audit::emit(&report, &config)?;
    if !report.is_complete() {
        log::warn!(
            "Audit incomplete for {} node(s); see warnings",
            report.incomplete_paths().len()
        );
    }
    Ok(())
}
