//! File utilities for managed directories.

use std::fs;
use std::path::Path;

use camvault_models::FileRecord;
use tracing::debug;

use crate::error::StorageResult;
use crate::stats;

/// Files under `dir`, recursively, newest modification first. A missing
/// directory yields an empty list.
pub fn list_files(dir: impl AsRef<Path>) -> StorageResult<Vec<FileRecord>> {
    let dir = dir.as_ref();
    let mut records = Vec::new();
    if dir.is_dir() {
        stats::collect(dir, &mut records)?;
        records.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
    }
    Ok(records)
}

/// Move a file, creating destination parents as needed. Falls back to
/// copy-and-remove when a rename crosses filesystems.
pub fn move_file(source: impl AsRef<Path>, dest: impl AsRef<Path>) -> StorageResult<()> {
    let source = source.as_ref();
    let dest = dest.as_ref();

    ensure_parent(dest)?;
    if fs::rename(source, dest).is_err() {
        fs::copy(source, dest)?;
        fs::remove_file(source)?;
    }

    debug!(source = %source.display(), dest = %dest.display(), "File moved");
    Ok(())
}

/// Copy a file, creating destination parents as needed. Returns the
/// number of bytes copied.
pub fn copy_file(source: impl AsRef<Path>, dest: impl AsRef<Path>) -> StorageResult<u64> {
    let source = source.as_ref();
    let dest = dest.as_ref();

    ensure_parent(dest)?;
    let bytes = fs::copy(source, dest)?;

    debug!(source = %source.display(), dest = %dest.display(), bytes, "File copied");
    Ok(bytes)
}

/// Delete a single file.
pub fn delete_file(path: impl AsRef<Path>) -> StorageResult<()> {
    let path = path.as_ref();
    fs::remove_file(path)?;
    debug!(path = %path.display(), "File deleted");
    Ok(())
}

fn ensure_parent(path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
