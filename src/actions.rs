use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{DupeError, Result};
use crate::grouping::DuplicatePair;

/// Base name of the per-root folder duplicates are moved into
pub const QUARANTINE_DIR_NAME: &str = "duplicates";

/// One file moved into quarantine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relocation {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Delete every duplicate and return the number of bytes freed.
///
/// The first file that cannot be measured or removed aborts the batch;
/// files deleted before it stay deleted.
pub fn delete_all(pairs: &[DuplicatePair]) -> Result<u64> {
    let mut freed: u64 = 0;

    for pair in pairs {
        let path = &pair.duplicate;
        let size = fs::metadata(path)
            .map_err(|source| DupeError::Delete {
                path: path.clone(),
                source,
            })?
            .len();

        fs::remove_file(path).map_err(|source| DupeError::Delete {
            path: path.clone(),
            source,
        })?;
        log::info!("deleted {} ({} bytes)", path.display(), size);

        freed += size;
    }

    Ok(freed)
}

/// Move every duplicate into a quarantine folder and return where each
/// file went.
///
/// Each duplicate goes to the folder of the most specific root containing
/// it (or the first root when none does). A root gets at most one folder,
/// created on first use; existing names are never overwritten. The first
/// failure aborts the batch without undoing earlier moves.
pub fn move_all_to_quarantine(
    pairs: &[DuplicatePair],
    roots: &[PathBuf],
) -> Result<Vec<Relocation>> {
    if pairs.is_empty() {
        return Ok(Vec::new());
    }
    if roots.is_empty() {
        return Err(DupeError::NoRoots);
    }

    let mut folders: Vec<Option<PathBuf>> = vec![None; roots.len()];
    let mut relocations = Vec::with_capacity(pairs.len());

    for pair in pairs {
        let from = &pair.duplicate;
        let root = owning_root(from, roots).unwrap_or(0);

        let folder = match folders[root].clone() {
            Some(folder) => folder,
            None => {
                let folder = create_quarantine_dir(&roots[root])?;
                folders[root] = Some(folder.clone());
                folder
            }
        };

        let file_name = from.file_name().ok_or_else(|| DupeError::Move {
            from: from.clone(),
            to: folder.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        })?;
        let to = free_target(&folder, Path::new(file_name));

        move_file(from, &to).map_err(|source| DupeError::Move {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;
        log::info!("moved {} -> {}", from.display(), to.display());

        relocations.push(Relocation {
            from: from.clone(),
            to,
        });
    }

    Ok(relocations)
}

/// Index of the longest root that is a prefix of `path`
fn owning_root(path: &Path, roots: &[PathBuf]) -> Option<usize> {
    roots
        .iter()
        .enumerate()
        .filter(|(_, root)| path.starts_with(root))
        .max_by_key(|(_, root)| root.components().count())
        .map(|(i, _)| i)
}

/// Create `duplicates` (or the first free `duplicates_N`) inside `root`
fn create_quarantine_dir(root: &Path) -> Result<PathBuf> {
    let mut folder = root.join(QUARANTINE_DIR_NAME);
    let mut counter = 1;
    while is_taken(&folder) {
        folder = root.join(format!("{}_{}", QUARANTINE_DIR_NAME, counter));
        counter += 1;
    }

    fs::create_dir_all(&folder).map_err(|source| DupeError::Quarantine {
        path: folder.clone(),
        source,
    })?;
    log::info!("created quarantine folder {}", folder.display());

    Ok(folder)
}

/// First path in `dir` named `file_name`, or `stem_N.ext` when taken
fn free_target(dir: &Path, file_name: &Path) -> PathBuf {
    let mut target = dir.join(file_name);
    let stem = file_name.file_stem().unwrap_or(file_name.as_os_str());
    let extension = file_name.extension();

    let mut counter = 1;
    while is_taken(&target) {
        let mut candidate = OsString::from(stem);
        candidate.push(format!("_{}", counter));
        if let Some(ext) = extension {
            candidate.push(".");
            candidate.push(ext);
        }
        target = dir.join(candidate);
        counter += 1;
    }

    target
}

/// Dangling symlinks count as taken
fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Rename, falling back to copy and delete across filesystems
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}
