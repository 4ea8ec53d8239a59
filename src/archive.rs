use chrono::{Duration, NaiveDateTime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const PREFIX: &str = "system-dashboard-";
const SUFFIX: &str = ".html";
const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to create archive directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to write archive copy {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to list archive directory {path}: {source}")]
    List { path: PathBuf, source: io::Error },
}

pub fn archive_name(at: NaiveDateTime) -> String {
    format!("{PREFIX}{}{SUFFIX}", at.format(STAMP_FORMAT))
}

pub fn archived_at(file_name: &str) -> Option<NaiveDateTime> {
    let stamp = file_name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()
}

pub fn archive_report(dir: &Path, html: &str, at: NaiveDateTime) -> Result<PathBuf, ArchiveError> {
    fs::create_dir_all(dir).map_err(|source| ArchiveError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(archive_name(at));
    fs::write(&path, html).map_err(|source| ArchiveError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

pub fn prune(dir: &Path, retention_days: u32, now: NaiveDateTime) -> Result<usize, ArchiveError> {
    let Some(cutoff) = now.checked_sub_signed(Duration::days(i64::from(retention_days))) else {
        debug!(retention_days, "retention reaches before the calendar range, nothing to prune");
        return Ok(0);
    };
    let entries = fs::read_dir(dir).map_err(|source| ArchiveError::List {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(stamp) = name.to_str().and_then(archived_at) else {
            continue;
        };
        if stamp >= cutoff {
            continue;
        }
        let path = entry.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "expired report removed");
                removed += 1;
            }
            Err(err) => warn!(path = %path.display(), error = %err, "failed to remove expired report"),
        }
    }
    Ok(removed)
}

pub fn backup(
    dir: &Path,
    retention_days: u32,
    html: &str,
    now: NaiveDateTime,
) -> Result<PathBuf, ArchiveError> {
    let path = archive_report(dir, html, now)?;
    let removed = prune(dir, retention_days, now)?;
    info!(path = %path.display(), removed, "report archived");
    Ok(path)
}
