//! `halofp` command line: fingerprint a directory tree and print the result
//! as JSON.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use halofp::{CodebaseReport, HalofpConfig, Resource, fingerprint_path};

#[derive(Debug, Parser)]
#[command(name = "halofp", version, about = "Compute file and directory similarity fingerprints")]
struct Cli {
    /// Directory to fingerprint
    path: PathBuf,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fingerprint files and directories on all cores
    #[arg(long)]
    parallel: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    json_logs: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct Summary {
    files_fingerprinted: usize,
    files_skipped: usize,
    file_failures: Vec<Failure>,
    scan_failures: Vec<Failure>,
    directories_visited: usize,
    directories_fingerprinted: usize,
    directories_skipped: usize,
    directory_failures: Vec<Failure>,
}

#[derive(Serialize)]
struct Failure {
    path: String,
    error: String,
}

#[derive(Serialize)]
struct Output<'a> {
    summary: Summary,
    resources: Vec<&'a Resource>,
}

impl From<&CodebaseReport> for Summary {
    fn from(report: &CodebaseReport) -> Self {
        Self {
            files_fingerprinted: report.files_fingerprinted,
            files_skipped: report.files_skipped,
            file_failures: report
                .file_failures
                .iter()
                .map(|f| Failure {
                    path: f.path.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
            scan_failures: report
                .scan_failures
                .iter()
                .map(|f| Failure {
                    path: f.path.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
            directories_visited: report.directories.visited,
            directories_fingerprinted: report.directories.fingerprinted,
            directories_skipped: report.directories.skipped,
            directory_failures: report
                .directories
                .failures
                .iter()
                .map(|f| Failure {
                    path: f.path.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = match &cli.config {
        Some(path) => HalofpConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HalofpConfig::default(),
    };
    if cli.parallel {
        config.directory.use_parallel = true;
        config.perceptual.use_parallel = true;
    }

    let (codebase, report) = fingerprint_path(&cli.path, &config)
        .with_context(|| format!("fingerprinting {}", cli.path.display()))?;

    let output = Output {
        summary: Summary::from(&report),
        resources: codebase.iter().collect(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.pretty {
        serde_json::to_writer_pretty(&mut out, &output)?;
    } else {
        serde_json::to_writer(&mut out, &output)?;
    }
    writeln!(out)?;
    Ok(())
}
