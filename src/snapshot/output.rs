//! Snapshot file layout.
//!
//! `/` lands on `<root>/index.html`, every other route on
//! `<root>/<route>/index.html`, and `<root>/404.html` mirrors the root page
//! for static hosts that need a catch-all.

use std::fs;
use std::path::{Path, PathBuf};

use super::SnapshotError;
use crate::log;
use crate::page::Route;

pub const NOT_FOUND_FILE: &str = "404.html";

/// Write one captured page, creating parent directories as needed.
pub fn write_snapshot(root: &Path, route: &Route, html: &str) -> Result<PathBuf, SnapshotError> {
    let path = route.snapshot_path(root);
    write(&path, html)?;
    Ok(path)
}

/// Write `404.html` from the root page.
///
/// Without a captured root, the existing `<root>/index.html` is copied
/// instead. Returns `None` when neither exists.
pub fn write_not_found(root: &Path, root_html: Option<&str>) -> Result<Option<PathBuf>, SnapshotError> {
    let path = root.join(NOT_FOUND_FILE);

    if let Some(html) = root_html {
        write(&path, html)?;
        return Ok(Some(path));
    }

    let index = Route::root().snapshot_path(root);
    if !index.is_file() {
        log!("warning"; "no root page to copy into {}", NOT_FOUND_FILE);
        return Ok(None);
    }
    fs::copy(&index, &path).map_err(|source| SnapshotError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(Some(path))
}

fn write(path: &Path, html: &str) -> Result<(), SnapshotError> {
    let io_error = |source| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, html).map_err(io_error)
}
