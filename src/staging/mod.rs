//! Filesystem staging operations
//!
//! Relocate build artifacts between the framework's output layout and the
//! layout the managed runtime expects. Missing optional inputs are reported
//! through outcome values; only unexpected I/O failures are errors.

pub mod inject;

pub use inject::{inject_config, InjectionOutcome, CONFIG_CONSTANT, CONFIG_PLACEHOLDER};

use crate::error::BuildError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Result of [`copy_dir`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The tree was copied; `files` counts regular files and links
    Copied { files: usize },
    /// The source does not exist; nothing was created
    SourceMissing,
}

/// Result of [`patch_file`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Patched,
    /// The marker was absent; the file was not rewritten
    MarkerNotFound,
}

/// Whether `path` exists, treating permission problems as errors
pub async fn path_exists(path: &Path) -> Result<bool, BuildError> {
    fs::try_exists(path)
        .await
        .map_err(|e| BuildError::staging("inspect", path, e))
}

/// Create `path` and all missing parents
pub async fn ensure_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| BuildError::staging("create directory", path, e))
}

/// Recursively copy `src` into `dst`
///
/// `dst` is created if absent. A missing `src` is not an error: the copy is
/// skipped and `dst` is left untouched.
pub async fn copy_dir(src: &Path, dst: &Path) -> Result<CopyOutcome, BuildError> {
    if !path_exists(src).await? {
        debug!("Copy source {} does not exist", src.display());
        return Ok(CopyOutcome::SourceMissing);
    }

    let mut files = 0;
    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(src.to_path_buf(), dst.to_path_buf())];

    while let Some((from_dir, to_dir)) = pending.pop() {
        ensure_dir(&to_dir).await?;

        let mut entries = fs::read_dir(&from_dir)
            .await
            .map_err(|e| BuildError::staging("read directory", &from_dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BuildError::staging("read directory", &from_dir, e))?
        {
            let from = entry.path();
            let to = to_dir.join(entry.file_name());
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| BuildError::staging("inspect", &from, e))?;

            if file_type.is_dir() {
                pending.push((from, to));
            } else if file_type.is_symlink() {
                copy_symlink(&from, &to).await?;
                files += 1;
            } else {
                fs::copy(&from, &to)
                    .await
                    .map_err(|e| BuildError::staging("copy", &from, e))?;
                files += 1;
            }
        }
    }

    debug!("Copied {} files from {} to {}", files, src.display(), dst.display());
    Ok(CopyOutcome::Copied { files })
}

#[cfg(unix)]
async fn copy_symlink(from: &Path, to: &Path) -> Result<(), BuildError> {
    let target = fs::read_link(from)
        .await
        .map_err(|e| BuildError::staging("read link", from, e))?;
    remove_if_exists(to).await?;
    fs::symlink(&target, to)
        .await
        .map_err(|e| BuildError::staging("create link", to, e))
}

#[cfg(not(unix))]
async fn copy_symlink(from: &Path, to: &Path) -> Result<(), BuildError> {
    fs::copy(from, to)
        .await
        .map(|_| ())
        .map_err(|e| BuildError::staging("copy", from, e))
}

async fn remove_if_exists(path: &Path) -> Result<(), BuildError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::staging("remove", path, e)),
    }
}

/// Recursively remove `path`
///
/// Idempotent: returns `false` when there was nothing to remove.
pub async fn remove_dir(path: &Path) -> Result<bool, BuildError> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(BuildError::staging("inspect", path, e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };

    match result {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BuildError::staging("remove", path, e)),
    }
}

/// Rename `from` to `to`
pub async fn rename_path(from: &Path, to: &Path) -> Result<(), BuildError> {
    fs::rename(from, to)
        .await
        .map_err(|e| BuildError::staging("rename", from, e))
}

/// Copy a single file, creating the destination's parent directory
pub async fn copy_file(from: &Path, to: &Path) -> Result<(), BuildError> {
    if let Some(parent) = to.parent() {
        ensure_dir(parent).await?;
    }
    fs::copy(from, to)
        .await
        .map(|_| ())
        .map_err(|e| BuildError::staging("copy", from, e))
}

/// Move a file by copying it and deleting the original
///
/// Works across filesystems, unlike a rename.
pub async fn move_file(from: &Path, to: &Path) -> Result<(), BuildError> {
    copy_file(from, to).await?;
    fs::remove_file(from)
        .await
        .map_err(|e| BuildError::staging("remove", from, e))
}

/// Replace the first occurrence of `marker` in a text file
///
/// When the marker is absent the file is not written at all.
pub async fn patch_file(
    path: &Path,
    marker: &str,
    replacement: &str,
) -> Result<PatchOutcome, BuildError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| BuildError::staging("read", path, e))?;

    if !content.contains(marker) {
        return Ok(PatchOutcome::MarkerNotFound);
    }

    let patched = content.replacen(marker, replacement, 1);
    fs::write(path, patched)
        .await
        .map_err(|e| BuildError::staging("write", path, e))?;
    Ok(PatchOutcome::Patched)
}
