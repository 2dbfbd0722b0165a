use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;

use globset::GlobSet;
use serde::Serialize;

use crate::error::Result;
use crate::hasher::{Fingerprint, Fingerprinter};
use crate::progress::ProgressSink;
use crate::scanner;

/// A later-enumerated file and the first file seen with the same fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicatePair {
    pub duplicate: PathBuf,
    pub original: PathBuf,
}

/// Everything one scan produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Roots that were scanned, in the order given
    pub roots: Vec<PathBuf>,
    /// Number of files that were enumerated and fingerprinted
    pub files_scanned: usize,
    /// Pairs in enumeration order of their duplicate
    pub pairs: Vec<DuplicatePair>,
}

/// Whether a scan left anything to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome<'a> {
    NoDuplicates,
    Duplicates(&'a [DuplicatePair]),
}

impl ScanResult {
    pub fn outcome(&self) -> ScanOutcome<'_> {
        if self.pairs.is_empty() {
            ScanOutcome::NoDuplicates
        } else {
            ScanOutcome::Duplicates(&self.pairs)
        }
    }
}

/// Settings for one scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub fingerprinter: Fingerprinter,
    pub exclusions: GlobSet,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            fingerprinter: Fingerprinter::default(),
            exclusions: GlobSet::empty(),
        }
    }
}

/// Enumerate `roots`, then fingerprint every file and pair up duplicates.
pub fn scan<P>(roots: &[PathBuf], options: &ScanOptions, progress: &mut P) -> Result<ScanResult>
where
    P: ProgressSink + ?Sized,
{
    let files: Vec<PathBuf> = scanner::enumerate_files(roots, &options.exclusions).collect();
    log::info!("found {} files under {} root(s)", files.len(), roots.len());

    let files_scanned = files.len();
    let pairs = find_duplicates(files, &options.fingerprinter, progress)?;
    log::info!("found {} duplicate(s)", pairs.len());

    Ok(ScanResult {
        roots: roots.to_vec(),
        files_scanned,
        pairs,
    })
}

/// Fingerprint `files` in order and pair every repeat with the first file
/// that had its fingerprint.
///
/// The first file of a group is always the original; later members never
/// chain off each other. `progress` receives the completed percentage after
/// every file and is not called at all for an empty list.
pub fn find_duplicates<P>(
    files: Vec<PathBuf>,
    fingerprinter: &Fingerprinter,
    progress: &mut P,
) -> Result<Vec<DuplicatePair>>
where
    P: ProgressSink + ?Sized,
{
    let total = files.len();
    let mut index: HashMap<Fingerprint, PathBuf> = HashMap::with_capacity(total);
    let mut pairs = Vec::new();

    for (i, path) in files.into_iter().enumerate() {
        let fingerprint = fingerprinter.fingerprint(&path)?;
        log::trace!("{} {}", fingerprint, path.display());

        match index.entry(fingerprint) {
            Entry::Occupied(original) => pairs.push(DuplicatePair {
                duplicate: path,
                original: original.get().clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(path);
            }
        }

        progress.report((i + 1) as f64 / total as f64 * 100.0);
    }

    Ok(pairs)
}
