//! limcheck CLI
//!
//! Checks that the C library's limit constants match the kernel's.
//! Exits 0 when they do and 1 when they do not or cannot be extracted.

use anyhow::{bail, Context, Result};
use clap::Parser;
use limcheck_check::{CheckReport, LimitChecker};
use limcheck_core::{CheckConfig, CompilerCommand};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "limcheck")]
#[command(author, version, about = "Test that the C library's limits.h constants match the kernel's", long_about = None)]
struct Cli {
    /// C compiler (including options) to use
    #[arg(long, value_name = "CC", env = "CC")]
    cc: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Log extraction details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.format != "text" && cli.format != "json" {
        bail!("Unknown format: {}", cli.format);
    }

    let compiler = cli.cc.map(CompilerCommand::new).unwrap_or_default();
    let config = CheckConfig::default().with_compiler(compiler);

    let report = run_check(&config)?;
    print_report(&report, &cli.format)?;

    Ok(ExitCode::from(report.verdict.exit_code()))
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_check(config: &CheckConfig) -> Result<CheckReport> {
    let checker = LimitChecker::from_config(config).context("Invalid configuration")?;

    if let Some(version) = checker.extractor().compiler().version() {
        debug!("Compiler: {}", version);
    }

    checker.check_pairs(&config.pairs).map_err(|e| {
        let context = if e.is_invocation_error() {
            format!("Failed to run the C compiler `{}`", config.compiler)
        } else {
            format!("Could not read limit values from `{}` output", config.compiler)
        };
        anyhow::Error::new(e).context(context)
    })
}

fn print_report(report: &CheckReport, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
