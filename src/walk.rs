//! File enumeration — turns path arguments into readable source files.

use crate::model::SourceFile;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Which files a directory walk keeps.
#[derive(Debug, Clone, Copy)]
pub struct FileFilter<'a> {
    pub file_types: &'a [String],
    pub ignore_paths: &'a [String],
}

impl FileFilter<'_> {
    pub fn is_ignored(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.ignore_paths
            .iter()
            .any(|ignore| !ignore.is_empty() && path.contains(ignore.as_str()))
    }

    pub fn has_file_type(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.file_types.iter().any(|t| t == ext))
    }
}

/// Expand files, directories and glob patterns into a sorted list of paths.
///
/// Explicit files are always kept. Directories are walked recursively and
/// filtered by extension and ignore list; glob matches by ignore list only.
pub fn collect_paths(inputs: &[String], filter: FileFilter<'_>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            walk_dir(path, filter, &mut files);
            continue;
        }
        let matches: Vec<_> = glob::glob(input)
            .with_context(|| format!("invalid glob pattern: {}", input))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file() && !filter.is_ignored(p))
            .collect();
        if matches.is_empty() {
            warn!("no files matched: {}", input);
        }
        files.extend(matches);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn walk_dir(root: &Path, filter: FileFilter<'_>, files: &mut Vec<PathBuf>) {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !filter.is_ignored(e.path()));
    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && filter.has_file_type(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            Err(e) => warn!("skipping unreadable entry: {}", e),
        }
    }
}

/// Read one file with its timestamps.
pub fn read_source(path: &Path) -> Result<SourceFile> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let meta = fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?;
    let modified = meta.modified().map(timestamp).unwrap_or_else(|_| epoch());
    let created = meta.created().map(timestamp).unwrap_or(modified);
    Ok(SourceFile {
        path: path.to_path_buf(),
        content,
        created,
        modified,
    })
}

/// Read every path, skipping (and logging) the ones that fail.
pub fn read_sources(paths: &[PathBuf]) -> Vec<SourceFile> {
    paths
        .iter()
        .filter_map(|path| match read_source(path) {
            Ok(source) => {
                debug!(file = %path.display(), bytes = source.content.len(), "read source");
                Some(source)
            }
            Err(e) => {
                warn!("skipping {}: {:#}", path.display(), e);
                None
            }
        })
        .collect()
}

fn timestamp(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

fn epoch() -> DateTime<Utc> {
    timestamp(SystemTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "/** @summary x */").unwrap();
        path
    }

    fn filter<'a>(types: &'a [String], ignore: &'a [String]) -> FileFilter<'a> {
        FileFilter {
            file_types: types,
            ignore_paths: ignore,
        }
    }

    #[test]
    fn walks_directories_recursively() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.ts");
        let b = touch(dir.path(), "nested/deep/b.js");
        touch(dir.path(), "notes.md");
        touch(dir.path(), "node_modules/pkg/index.js");

        let types = vec!["ts".to_string(), "js".to_string()];
        let ignore = vec!["node_modules".to_string()];
        let root = dir.path().to_string_lossy().to_string();
        let found = collect_paths(&[root], filter(&types, &ignore)).unwrap();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[test]
    fn explicit_files_always_kept() {
        let dir = TempDir::new().unwrap();
        let md = touch(dir.path(), "notes.md");
        let types = vec!["ts".to_string()];
        let found = collect_paths(
            &[md.to_string_lossy().to_string(), md.to_string_lossy().to_string()],
            filter(&types, &[]),
        )
        .unwrap();
        assert_eq!(found, vec![md]);
    }

    #[test]
    fn glob_patterns() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "src/a.ts");
        touch(dir.path(), "src/_ARCHIVE/old.ts");
        let types = vec!["ts".to_string()];
        let ignore = vec!["_ARCHIVE".to_string()];
        let pattern = format!("{}/src/**/*.ts", dir.path().display());
        let found = collect_paths(&[pattern], filter(&types, &ignore)).unwrap();
        assert_eq!(found, vec![a]);
    }

    #[test]
    fn unmatched_glob_is_empty() {
        let dir = TempDir::new().unwrap();
        let pattern = format!("{}/*.nothing", dir.path().display());
        let types = vec!["ts".to_string()];
        assert!(collect_paths(&[pattern], filter(&types, &[])).unwrap().is_empty());
    }

    #[test]
    fn reads_content_and_timestamps() {
        let dir = TempDir::new().unwrap();
        let path = touch(dir.path(), "a.ts");
        let source = read_source(&path).unwrap();
        assert_eq!(source.content, "/** @summary x */");
        assert!(source.modified > epoch());
        assert!(read_source(&dir.path().join("missing.ts")).is_err());
    }

    #[test]
    fn read_sources_skips_failures() {
        let dir = TempDir::new().unwrap();
        let path = touch(dir.path(), "a.ts");
        let sources = read_sources(&[path, dir.path().join("missing.ts")]);
        assert_eq!(sources.len(), 1);
    }
}
