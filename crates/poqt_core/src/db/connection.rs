//! Open the DB with WAL, foreign keys and migrations.

use rusqlite::Connection;
use std::path::Path;

use super::layout;
use super::migrations;
use crate::Result;

fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;")?;
    migrations::run_all(conn)?;
    Ok(())
}

/// Opens the DB under `data_dir` (e.g. ~/.poqt). Creates dirs if needed,
/// enables WAL, runs migrations.
pub fn open_db_at(data_dir: &Path) -> Result<Connection> {
    let db_path = layout::ensure_data_dir_at(data_dir)?;
    let conn = Connection::open(&db_path)?;
    conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))?;
    configure(&conn)?;
    tracing::debug!(path = %db_path.display(), "opened task database");
    Ok(conn)
}

/// Private in-memory DB with the full schema.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    Ok(conn)
}
