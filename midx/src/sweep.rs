//! Remove multi-index files from a directory.
//!
//! Sweeping is maintenance, not a correctness requirement: a file that cannot be removed is
//! recorded in the returned [Report] and the sweep moves on to the next one. Only failing to
//! list the directory at all is an error.

use crate::{is_midx, Config, Error, Midx};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Outcome of a sweep.
#[derive(Debug, Default)]
pub struct Report {
    /// Files that were removed.
    pub removed: Vec<PathBuf>,
    /// Files that were left in place.
    pub kept: Vec<PathBuf>,
    /// Files that could not be inspected or removed.
    pub failed: Vec<Error>,
}

/// Returns every multi-index file directly within `dir`, sorted by path.
pub fn scan(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let display = || dir.display().to_string();
    let entries = fs::read_dir(dir).map_err(|e| Error::ScanFailed(display(), e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::ScanFailed(display(), e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| Error::ScanFailed(display(), e))?;
        if !file_type.is_file() {
            continue;
        }
        let path = entry.path();
        if is_midx(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Remove `path`, recording the outcome in `report`.
fn remove(path: PathBuf, report: &mut Report) {
    match fs::remove_file(&path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed midx");
            report.removed.push(path);
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to remove midx");
            report
                .failed
                .push(Error::RemoveFailed(path.display().to_string(), e));
        }
    }
}

/// Remove every multi-index file directly within `dir`.
pub fn clear(dir: &Path) -> Result<Report, Error> {
    let mut report = Report::default();
    for path in scan(dir)? {
        remove(path, &mut report);
    }
    Ok(report)
}

/// Remove every multi-index file directly within `dir` that was written by an older version
/// of the format.
///
/// Readable files and files of an unknown format are kept (see [Midx::force_keep]).
pub fn prune(dir: &Path, cfg: &Config) -> Result<Report, Error> {
    let mut report = Report::default();
    for path in scan(dir)? {
        let obsolete = match Midx::open(&path, cfg) {
            Ok(midx) => midx.is_degraded() && !midx.force_keep(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to inspect midx");
                report.failed.push(err);
                continue;
            }
        };
        if obsolete {
            remove(path, &mut report);
        } else {
            report.kept.push(path);
        }
    }
    Ok(report)
}
