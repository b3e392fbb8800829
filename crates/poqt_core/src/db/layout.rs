//! Data directory layout.
//!
//! - `poqt.db` + WAL: tasks, lists, membership, config.
//! - `logs/`: log files written by long-running hosts (`poqt watch`).

use std::path::{Path, PathBuf};

use crate::Result;

/// Basename of the DB (SQLite creates .db-wal and .db-shm alongside).
pub const POQT_DB: &str = "poqt.db";
/// Subdir for log files.
pub const LOGS_DIR: &str = "logs";

/// Ensures `data_dir` and `data_dir/logs` exist; returns path to poqt.db.
pub fn ensure_data_dir_at(data_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(data_dir)?;
    std::fs::create_dir_all(data_dir.join(LOGS_DIR))?;
    Ok(data_dir.join(POQT_DB))
}

pub fn logs_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(LOGS_DIR)
}
