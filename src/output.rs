use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::actions::Relocation;
use crate::grouping::{ScanOutcome, ScanResult};
use crate::hasher::HashAlgorithm;
use crate::util::{format_bytes, format_number};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Statistics about duplicate files found
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateStats {
    /// Total number of files scanned
    pub files_scanned: usize,
    /// Number of files that duplicate an earlier one
    pub duplicate_files: usize,
    /// Space held by the duplicates right now
    pub reclaimable_bytes: u64,
}

/// One duplicate and the original it matched
#[derive(Debug, Clone, Serialize)]
pub struct PairEntry {
    pub duplicate: PathBuf,
    pub original: PathBuf,
    /// Current size of the duplicate, 0 if it can no longer be read
    pub size: u64,
}

/// What a resolver action did
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Resolution {
    Deleted { files: usize, bytes_freed: u64 },
    Moved { relocations: Vec<Relocation> },
}

/// Complete report of one scan and, optionally, its resolution
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateReport {
    pub algorithm: HashAlgorithm,
    pub roots: Vec<PathBuf>,
    pub stats: DuplicateStats,
    pub pairs: Vec<PairEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl DuplicateReport {
    /// Build a report from a scan, measuring each duplicate as it is now
    pub fn from_scan(result: &ScanResult, algorithm: HashAlgorithm) -> Self {
        let pairs: Vec<PairEntry> = result
            .pairs
            .iter()
            .map(|pair| PairEntry {
                duplicate: pair.duplicate.clone(),
                original: pair.original.clone(),
                size: fs::metadata(&pair.duplicate).map(|m| m.len()).unwrap_or(0),
            })
            .collect();

        let stats = DuplicateStats {
            files_scanned: result.files_scanned,
            duplicate_files: pairs.len(),
            reclaimable_bytes: pairs.iter().map(|p| p.size).sum(),
        };

        Self {
            algorithm,
            roots: result.roots.clone(),
            stats,
            pairs,
            resolution: None,
        }
    }

    /// Output the duplicate listing as human-readable colored text
    pub fn print_human(&self, outcome: ScanOutcome<'_>) {
        println!("\n{}", "Duplicate Report".bold().underline());
        println!(
            "  Scanned: {} files",
            format_number(self.stats.files_scanned).cyan()
        );
        println!(
            "  Duplicate files: {}",
            format_number(self.stats.duplicate_files).cyan()
        );
        println!(
            "  Reclaimable space: {}",
            format_bytes(self.stats.reclaimable_bytes).yellow()
        );

        if let ScanOutcome::NoDuplicates = outcome {
            println!("\n{}", "No duplicates found.".green());
            return;
        }

        for pair in &self.pairs {
            println!("\n{} {}", "Duplicate:".bold(), pair.duplicate.display());
            println!("{} {}", "Original:".dimmed(), pair.original.display());
        }
    }

    /// Output as JSON
    pub fn print_json(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing to JSON: {}", e),
        }
    }
}

impl Resolution {
    pub fn print_human(&self) {
        match self {
            Resolution::Deleted { files, bytes_freed } => {
                println!(
                    "\n{} {} duplicates. Total size freed: {}",
                    "Deleted".green(),
                    format_number(*files),
                    format!("{:.2} MB", *bytes_freed as f64 / BYTES_PER_MB).yellow()
                );
            }
            Resolution::Moved { relocations } => {
                println!(
                    "\n{} {} duplicates into quarantine folders:",
                    "Moved".green(),
                    format_number(relocations.len())
                );
                for relocation in relocations {
                    println!(
                        "  {} -> {}",
                        relocation.from.display(),
                        relocation.to.display()
                    );
                }
            }
        }
    }
}
