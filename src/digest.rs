//! Content digests of output trees
//!
//! Two builds of an unchanged content store should produce the same digest;
//! generator lock files and similar artifacts are excluded through glob patterns.

use glob::Pattern;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Digest and size of a directory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeDigest {
    /// Hex-encoded SHA-256
    pub hex: String,
    /// Number of files hashed
    pub files: usize,
}

/// Compile ignore globs; invalid patterns are reported and skipped
pub fn ignore_patterns(globs: &[String]) -> Vec<Pattern> {
    globs
        .iter()
        .filter_map(|g| match Pattern::new(g) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!("Ignoring invalid digest pattern '{}': {}", g, e);
                None
            }
        })
        .collect()
}

/// Files of `dir` as sorted `/`-separated relative paths, minus ignored ones
pub fn tree_files(dir: &Path, ignore: &[Pattern]) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::io(
                path,
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop")),
            )
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if ignore.iter().any(|p| p.matches(&relative)) {
            continue;
        }
        files.push((relative, entry.path().to_path_buf()));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// SHA-256 over every file's relative path and bytes, in path order
pub fn tree_digest(dir: &Path, ignore: &[Pattern]) -> Result<TreeDigest> {
    let files = tree_files(dir, ignore)?;
    let mut hasher = Sha256::new();
    for (relative, path) in &files {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        hasher.update((relative.len() as u64).to_le_bytes());
        hasher.update(relative.as_bytes());
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    Ok(TreeDigest {
        hex: hex::encode(hasher.finalize()),
        files: files.len(),
    })
}
