//! Publishing a finished output tree
//!
//! The new tree is assembled next to the target and swapped in with renames,
//! so the target is either the previous deployment or the new one.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::PublishConfig;
use crate::error::{Error, Result};

/// What gets written besides the output tree
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    pub cname: Option<String>,
    pub nojekyll: bool,
    /// Entries of an existing target carried over untouched, e.g. `.git`
    pub keep: Vec<String>,
}

impl From<&PublishConfig> for PublishOptions {
    fn from(config: &PublishConfig) -> Self {
        Self {
            cname: config
                .cname
                .as_ref()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            nojekyll: config.nojekyll,
            keep: config.keep.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublishReport {
    pub target: PathBuf,
    /// Files copied from the output tree
    pub files: usize,
}

/// Replace `target` with a copy of `source`
pub fn publish(source: &Path, target: &Path, options: &PublishOptions) -> Result<PublishReport> {
    if !source.is_dir() || is_empty_dir(source)? {
        return Err(Error::EmptyOutput {
            path: source.to_path_buf(),
        });
    }
    // The old target is removed after the swap
    if crate::normalize_path(source).starts_with(crate::normalize_path(target)) {
        return Err(Error::PublishOverlap {
            source_dir: source.to_path_buf(),
            target: target.to_path_buf(),
        });
    }

    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "publish".to_string());
    let parent = target.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;

    let staging = parent.join(format!(".{name}.folio-new"));
    let backup = parent.join(format!(".{name}.folio-old"));
    remove_if_exists(&staging)?;
    remove_if_exists(&backup)?;

    let files = match stage(source, &staging, options) {
        Ok(files) => files,
        Err(e) => {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }
    };

    swap(target, &staging, &backup, &options.keep)?;
    remove_if_exists(&backup)?;

    tracing::info!("Published {} files to {:?}", files, target);
    Ok(PublishReport {
        target: target.to_path_buf(),
        files,
    })
}

/// Copy the tree and the extra marker files into `staging`
fn stage(source: &Path, staging: &Path, options: &PublishOptions) -> Result<usize> {
    let files = copy_tree(source, staging)?;

    if let Some(cname) = &options.cname {
        let path = staging.join("CNAME");
        fs::write(&path, format!("{cname}\n")).map_err(|e| Error::io(&path, e))?;
    }
    if options.nojekyll {
        let path = staging.join(".nojekyll");
        fs::write(&path, "").map_err(|e| Error::io(&path, e))?;
    }
    Ok(files)
}

fn swap(target: &Path, staging: &Path, backup: &Path, keep: &[String]) -> Result<()> {
    let mut moved = Vec::new();
    if target.exists() {
        for entry in keep {
            let from = target.join(entry);
            if from.exists() {
                let to = staging.join(entry);
                remove_if_exists(&to)?;
                fs::rename(&from, &to).map_err(|e| Error::io(&from, e))?;
                moved.push((from, to));
            }
        }
        if let Err(e) = fs::rename(target, backup) {
            restore_kept(&moved);
            return Err(Error::io(target, e));
        }
    }

    if let Err(e) = fs::rename(staging, target) {
        tracing::error!("Could not move new tree into place: {}", e);
        if backup.exists() {
            if let Err(e) = fs::rename(backup, target) {
                tracing::error!("Could not restore previous deployment from {:?}: {}", backup, e);
            }
        }
        restore_kept(&moved);
        return Err(Error::io(target, e));
    }
    Ok(())
}

fn restore_kept(moved: &[(PathBuf, PathBuf)]) {
    for (original, staged) in moved {
        if let Err(e) = fs::rename(staged, original) {
            tracing::error!("Could not restore {:?}: {}", original, e);
        }
    }
}

/// Recursively copy `source` into `dest`, returning the number of files
pub fn copy_tree(source: &Path, dest: &Path) -> Result<usize> {
    let mut files = 0;
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            Error::io(
                path,
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop")),
            )
        })?;
        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let out = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&out).map_err(|e| Error::io(&out, e))?;
        } else {
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            fs::copy(entry.path(), &out).map_err(|e| Error::io(entry.path(), e))?;
            files += 1;
        }
    }
    Ok(files)
}

fn is_empty_dir(dir: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    Ok(entries.next().is_none())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path).map_err(|e| Error::io(path, e))?;
    } else if path.exists() {
        fs::remove_file(path).map_err(|e| Error::io(path, e))?;
    }
    Ok(())
}
