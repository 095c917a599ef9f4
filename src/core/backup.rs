//! Timestamped backup directories for source documents.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::store::LocalStore;

const BACKUP_DIR_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Create a fresh `<root>/<timestamp>` directory for this run.
pub fn create_backup_dir(root: &Path) -> Result<PathBuf> {
    create_backup_dir_at(root, Local::now())
}

/// Same as [`create_backup_dir`] with an explicit timestamp.
///
/// The leaf directory must not exist yet; two runs in the same second fail
/// rather than mixing their backups.
pub fn create_backup_dir_at(root: &Path, now: DateTime<Local>) -> Result<PathBuf> {
    let path = root.join(now.format(BACKUP_DIR_FORMAT).to_string());
    let display = path.display().to_string();

    fs::create_dir_all(root).map_err(|e| Error::backup_create_failed(&display, e.to_string()))?;
    fs::create_dir(&path).map_err(|e| Error::backup_create_failed(&display, e.to_string()))?;

    log_status!("backup", "Created {}", display);
    Ok(path)
}

/// Backup store rooted at a freshly created directory.
///
/// Overwrites are allowed because a graph that is walked without global
/// dedup backs up shared artifacts more than once.
pub fn backup_store(root: &Path) -> Result<LocalStore> {
    Ok(LocalStore::new(create_backup_dir(root)?).with_overwrite(true))
}
