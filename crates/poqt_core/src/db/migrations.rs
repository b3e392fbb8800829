//! SQL schema for the task DB. Applied on open ("create if absent").

use rusqlite::Connection;

use super::config::{get_config_value, set_config};
use crate::ordinal::ORDINAL_VERSION;
use crate::{PoqtError, Result};

/// Config key recording which ordinal mapping wrote the enum columns.
pub const ORDINAL_VERSION_KEY: &str = "schema.ordinal_version";

/// Config key-value store (preferences, id counters, schema markers).
pub const CONFIG: &str = "
CREATE TABLE IF NOT EXISTS config (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
";

/// Tasks. `due_date` is Unix milliseconds, NULL when the task has no due date.
pub const TASK: &str = "
CREATE TABLE IF NOT EXISTS task (
    id INTEGER PRIMARY KEY,
    description TEXT NOT NULL CHECK (length(trim(description)) > 0),
    due_date INTEGER,
    priority_ordinal INTEGER NOT NULL,
    reminder_ordinal INTEGER NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_task_pending ON task(completed, due_date);
";

/// Custom lists. Names are unique ignoring case.
pub const TASK_LIST: &str = "
CREATE TABLE IF NOT EXISTS task_list (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    render_kind_ordinal INTEGER NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_task_list_name ON task_list(name COLLATE NOCASE);
";

/// Many-to-many between custom lists and tasks.
pub const MEMBERSHIP: &str = "
CREATE TABLE IF NOT EXISTS membership (
    list_id INTEGER NOT NULL REFERENCES task_list(id) ON DELETE CASCADE,
    task_id INTEGER NOT NULL REFERENCES task(id) ON DELETE CASCADE,
    PRIMARY KEY (list_id, task_id)
);
CREATE INDEX IF NOT EXISTS idx_membership_task ON membership(task_id);
";

/// Run all migrations on an open connection.
pub fn run_all(conn: &Connection) -> Result<()> {
    conn.execute_batch(CONFIG)?;
    conn.execute_batch(TASK)?;
    conn.execute_batch(TASK_LIST)?;
    conn.execute_batch(MEMBERSHIP)?;
    check_ordinal_version(conn)
}

fn check_ordinal_version(conn: &Connection) -> Result<()> {
    match get_config_value(conn, ORDINAL_VERSION_KEY)? {
        None => set_config(conn, ORDINAL_VERSION_KEY, &ORDINAL_VERSION.to_string()),
        Some(stored) => {
            let stored: u32 = stored.parse().map_err(|_| {
                PoqtError::Config(format!("{} is not a number: '{}'", ORDINAL_VERSION_KEY, stored))
            })?;
            if stored > ORDINAL_VERSION {
                return Err(PoqtError::Config(format!(
                    "database uses ordinal version {}, this build understands up to {}",
                    stored, ORDINAL_VERSION
                )));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();
        run_all(&conn).unwrap();
        assert_eq!(
            get_config_value(&conn, ORDINAL_VERSION_KEY).unwrap(),
            Some(ORDINAL_VERSION.to_string())
        );
    }

    #[test]
    fn newer_ordinal_version_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();
        set_config(&conn, ORDINAL_VERSION_KEY, &(ORDINAL_VERSION + 1).to_string()).unwrap();
        let err = run_all(&conn).unwrap_err();
        assert!(matches!(err, PoqtError::Config(_)));
    }
}
