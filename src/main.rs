mod actions;
mod error;
mod grouping;
mod hasher;
mod logging;
mod output;
mod progress;
mod scanner;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use colored::Colorize;

use crate::error::Result;
use crate::grouping::{DuplicatePair, ScanOptions, ScanOutcome};
use crate::hasher::{DEFAULT_PREFIX_LIMIT, Fingerprinter, HashAlgorithm};
use crate::output::{DuplicateReport, Resolution};
use crate::progress::ScanBar;

#[derive(Parser, Debug)]
#[command(name = "dupesweep")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directories to scan for duplicates
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Action to take on duplicates
    #[arg(short, long, value_enum, default_value_t = Action::Report)]
    action: Action,

    /// Digest used to fingerprint files
    #[arg(long, value_enum, default_value_t = HashAlgorithm::Sha256)]
    hash: HashAlgorithm,

    /// Hash whole files instead of only their first MiB
    #[arg(long)]
    full: bool,

    /// Glob of file or directory names to skip (repeatable)
    #[arg(short, long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Don't show the progress bar
    #[arg(long)]
    no_progress: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for scripting
    Json,
}

/// What to do with found duplicates
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Action {
    /// Just report duplicates (default, no file changes)
    Report,
    /// Report, and exit with code 1 if duplicates were found
    ReportExitCode,
    /// Delete every duplicate, keeping originals
    Delete,
    /// Move duplicates into a `duplicates` folder inside their root
    Move,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let prefix_limit = if cli.full {
        None
    } else {
        Some(DEFAULT_PREFIX_LIMIT)
    };
    let options = ScanOptions {
        fingerprinter: Fingerprinter::new(cli.hash, prefix_limit),
        exclusions: scanner::build_exclusions(&cli.exclude)?,
    };

    // Stage 1: enumerate and fingerprint on a worker thread
    let show_progress = !cli.no_progress && matches!(cli.format, OutputFormat::Human);
    let bar = ScanBar::new(show_progress);
    let result = progress::scan_in_background(&cli.paths, &options, &bar)?;

    // Stage 2: list what was found
    let mut report = DuplicateReport::from_scan(&result, cli.hash);
    let outcome = result.outcome();
    if let OutputFormat::Human = cli.format {
        report.print_human(outcome);
    }

    // Stage 3: resolve, only when there is something to resolve
    let mut code = ExitCode::SUCCESS;
    if let ScanOutcome::Duplicates(pairs) = outcome {
        if let Action::ReportExitCode = cli.action {
            code = ExitCode::from(1);
        }
        report.resolution = resolve(cli.action, pairs, &result.roots)?;
    }

    match cli.format {
        OutputFormat::Human => {
            if let Some(resolution) = &report.resolution {
                resolution.print_human();
            }
        }
        OutputFormat::Json => report.print_json(),
    }

    Ok(code)
}

fn resolve(
    action: Action,
    pairs: &[DuplicatePair],
    roots: &[PathBuf],
) -> Result<Option<Resolution>> {
    match action {
        Action::Report | Action::ReportExitCode => Ok(None),
        Action::Delete => {
            let bytes_freed = actions::delete_all(pairs)?;
            Ok(Some(Resolution::Deleted {
                files: pairs.len(),
                bytes_freed,
            }))
        }
        Action::Move => {
            let relocations = actions::move_all_to_quarantine(pairs, roots)?;
            Ok(Some(Resolution::Moved { relocations }))
        }
    }
}
