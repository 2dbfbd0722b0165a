use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use jwalk::WalkDir;

use crate::error::{DupeError, Result};

/// Build a matcher from `--exclude` patterns
pub fn build_exclusions(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| DupeError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| DupeError::Pattern {
        pattern: patterns.join(", "),
        source,
    })
}

/// Lazily list every regular file under `roots`, root by root.
///
/// Within a directory, files come before subdirectories and both are sorted
/// by name, so the order is stable across runs. Symlinks are not followed.
/// A root that is missing or unreadable yields nothing.
pub fn enumerate_files<'a>(
    roots: &'a [PathBuf],
    exclusions: &'a GlobSet,
) -> impl Iterator<Item = PathBuf> + 'a {
    roots
        .iter()
        .flat_map(move |root| walk_root(root, exclusions))
}

fn walk_root(root: &Path, exclusions: &GlobSet) -> impl Iterator<Item = PathBuf> {
    let exclusions = Arc::new(exclusions.clone());
    let base = root.to_path_buf();
    let root_display = root.display().to_string();

    WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false) // Don't follow symlinks to avoid infinite loops
        .process_read_dir(move |_depth, _path, _state, children| {
            if !exclusions.is_empty() {
                children.retain(|entry| match entry {
                    Ok(entry) => !is_excluded(&exclusions, &base, &entry.path()),
                    Err(_) => true,
                });
            }
            children.sort_by(|a, b| match (a, b) {
                (Ok(a), Ok(b)) => (a.file_type.is_dir(), &a.file_name)
                    .cmp(&(b.file_type.is_dir(), &b.file_name)),
                (Ok(_), Err(_)) => Ordering::Less,
                (Err(_), Ok(_)) => Ordering::Greater,
                (Err(_), Err(_)) => Ordering::Equal,
            });
        })
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) if entry.file_type.is_file() => Some(entry.path()),
            Ok(_) => None,
            Err(e) => {
                log::warn!("skipping unreadable entry under {}: {}", root_display, e);
                None
            }
        })
}

/// An entry is excluded when a pattern matches its file name or its path
/// relative to the root it was found under.
fn is_excluded(exclusions: &GlobSet, root: &Path, path: &Path) -> bool {
    if let Some(name) = path.file_name() {
        if exclusions.is_match(name) {
            return true;
        }
    }
    match path.strip_prefix(root) {
        Ok(relative) => exclusions.is_match(relative),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper to create a test file with specific content
    fn create_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    fn scan(roots: &[PathBuf]) -> Vec<PathBuf> {
        enumerate_files(roots, &GlobSet::empty()).collect()
    }

    fn scan_excluding(root: &Path, patterns: &[&str]) -> Vec<PathBuf> {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        let exclusions = build_exclusions(&patterns).unwrap();
        enumerate_files(&[root.to_path_buf()], &exclusions).collect()
    }

    #[test]
    fn test_finds_files() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "file1.txt", b"hello");
        create_file(temp.path(), "file2.txt", b"world");

        let files = scan(&[temp.path().to_path_buf()]);

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_scans_subdirectories() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "root.txt", b"root");
        create_file(temp.path(), "subdir/nested.txt", b"nested");

        let files = scan(&[temp.path().to_path_buf()]);

        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.ends_with("root.txt")));
        assert!(files.iter().any(|f| f.ends_with("subdir/nested.txt")));
    }

    #[test]
    fn test_skips_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("subdir")).unwrap();
        create_file(temp.path(), "file.txt", b"content");

        let files = scan(&[temp.path().to_path_buf()]);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("file.txt"));
    }

    #[test]
    fn test_files_before_subdirectories() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "x.txt", b"hello");
        create_file(temp.path(), "sub/y.txt", b"hello");
        create_file(temp.path(), "z.txt", b"world");
        create_file(temp.path(), "a_dir/w.txt", b"deep");

        let files = scan(&[temp.path().to_path_buf()]);

        let expected = vec![
            temp.path().join("x.txt"),
            temp.path().join("z.txt"),
            temp.path().join("a_dir/w.txt"),
            temp.path().join("sub/y.txt"),
        ];
        assert_eq!(files, expected);
    }

    #[test]
    fn test_order_is_stable() {
        let temp = TempDir::new().unwrap();
        for i in 0..20 {
            create_file(temp.path(), &format!("d{}/f{}.txt", i % 4, i), b"x");
        }
        let roots = vec![temp.path().to_path_buf()];

        assert_eq!(scan(&roots), scan(&roots));
    }

    #[test]
    fn test_roots_enumerated_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        create_file(second.path(), "b.txt", b"b");
        create_file(first.path(), "a.txt", b"a");

        let files = scan(&[second.path().to_path_buf(), first.path().to_path_buf()]);

        assert_eq!(
            files,
            vec![second.path().join("b.txt"), first.path().join("a.txt")]
        );
    }

    #[test]
    fn test_missing_root_contributes_nothing() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "file.txt", b"content");

        let files = scan(&[
            temp.path().join("does-not-exist"),
            temp.path().to_path_buf(),
        ]);

        assert_eq!(files, vec![temp.path().join("file.txt")]);
    }

    #[test]
    fn test_nested_roots_report_files_twice() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "inner/file.txt", b"content");

        let files = scan(&[temp.path().to_path_buf(), temp.path().join("inner")]);

        assert_eq!(files.len(), 2);
        assert_eq!(files[0], files[1]);
    }

    #[test]
    fn test_empty_directory() {
        let temp = TempDir::new().unwrap();

        let files = scan(&[temp.path().to_path_buf()]);

        assert!(files.is_empty());
    }

    #[test]
    fn test_handles_symlinks() {
        let temp = TempDir::new().unwrap();
        let file_path = create_file(temp.path(), "real.txt", b"content");

        #[cfg(unix)]
        {
            let link_path = temp.path().join("link.txt");
            std::os::unix::fs::symlink(&file_path, &link_path).unwrap();
        }

        let files = scan(&[temp.path().to_path_buf()]);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("real.txt"));
    }

    #[test]
    fn test_hidden_files_included() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), ".hidden", b"secret");

        let files = scan(&[temp.path().to_path_buf()]);

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_deeply_nested() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "a/b/c/deep.txt", b"deep content");

        let files = scan(&[temp.path().to_path_buf()]);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("deep.txt"));
    }

    #[test]
    fn test_exclude_by_extension() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "keep.txt", b"keep");
        create_file(temp.path(), "skip.log", b"skip");
        create_file(temp.path(), "nested/skip.log", b"skip");

        let files = scan_excluding(temp.path(), &["*.log"]);

        assert_eq!(files, vec![temp.path().join("keep.txt")]);
    }

    #[test]
    fn test_exclude_prunes_directory() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "root.txt", b"root");
        create_file(temp.path(), "duplicates/old.txt", b"old");
        create_file(temp.path(), "duplicates/deeper/older.txt", b"older");

        let files = scan_excluding(temp.path(), &["duplicates"]);

        assert_eq!(files, vec![temp.path().join("root.txt")]);
    }

    #[test]
    fn test_exclude_relative_path_glob() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "src/main.rs", b"keep");
        create_file(temp.path(), "build/main.o", b"skip");

        let files = scan_excluding(temp.path(), &["**/*.o"]);

        assert_eq!(files, vec![temp.path().join("src/main.rs")]);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = build_exclusions(&["a[".to_string()]);

        assert!(matches!(result, Err(DupeError::Pattern { .. })));
    }
}
