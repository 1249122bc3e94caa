//! Atomic publish of a finished tree.
//!
//! 1. Refuse a target that exists and is not an empty directory.
//! 2. Write every file into a `.nodeinit-*` staging directory created
//!    next to the target (same filesystem).
//! 3. Rename the staging directory onto the target. When the target is an
//!    existing empty directory, move its entries in one by one and take
//!    them back out if any move fails.
//!
//! A failure at any step removes the staging directory and leaves the
//! target as it was.

use std::fs;
use std::path::{Path, PathBuf};

use nodeinit_core::Tree;

use crate::error::{io_err, StageError};

/// Fails with [`StageError::TargetNotEmpty`] unless `target` is absent or an
/// empty directory.
pub fn check_target(target: &Path) -> Result<(), StageError> {
    if !target.exists() {
        return Ok(());
    }
    let not_empty = || StageError::TargetNotEmpty {
        path: target.to_path_buf(),
    };
    if !target.is_dir() {
        return Err(not_empty());
    }
    let mut entries = fs::read_dir(target).map_err(|e| io_err(target, e))?;
    if entries.next().is_some() {
        return Err(not_empty());
    }
    Ok(())
}

/// Write `tree` to `target` all at once.
pub fn publish(tree: &Tree, target: &Path) -> Result<(), StageError> {
    check_target(target)?;
    // `.` has no usable parent; work from the real path.
    let resolved = if target.exists() {
        fs::canonicalize(target).map_err(|e| io_err(target, e))?
    } else {
        target.to_path_buf()
    };
    let target = resolved.as_path();

    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| io_err(&parent, e))?;

    let staging = tempfile::Builder::new()
        .prefix(".nodeinit-")
        .tempdir_in(&parent)
        .map_err(|e| io_err(&parent, e))?;

    for (path, node) in tree.iter() {
        let dest = path.to_path(staging.path());
        if let Some(dir) = dest.parent() {
            fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
        fs::write(&dest, node.as_bytes()).map_err(|e| io_err(&dest, e))?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staging.path(), fs::Permissions::from_mode(0o755))
            .map_err(|e| io_err(staging.path(), e))?;
    }

    if target.exists() {
        move_entries(staging.path(), target)?;
    } else {
        fs::rename(staging.path(), target).map_err(|e| io_err(target, e))?;
    }

    tracing::info!("wrote: {} ({} files)", target.display(), tree.len());
    Ok(())
}

fn move_entries(from: &Path, target: &Path) -> Result<(), StageError> {
    let entries = fs::read_dir(from).map_err(|e| io_err(from, e))?;
    let mut moved: Vec<PathBuf> = Vec::new();

    for entry in entries {
        let result = entry
            .map_err(|e| io_err(from, e))
            .and_then(|entry| {
                let dest = target.join(entry.file_name());
                fs::rename(entry.path(), &dest).map_err(|e| io_err(&dest, e))?;
                Ok(dest)
            });
        match result {
            Ok(dest) => moved.push(dest),
            Err(err) => {
                for path in moved.iter().rev() {
                    let removed = if path.is_dir() {
                        fs::remove_dir_all(path)
                    } else {
                        fs::remove_file(path)
                    };
                    if let Err(e) = removed {
                        tracing::warn!("rollback could not remove {}: {}", path.display(), e);
                    }
                }
                return Err(err);
            }
        }
    }
    Ok(())
}
