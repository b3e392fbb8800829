//! Config table: flat key/value preferences, id counters, schema markers.

use rusqlite::{params, Connection, OptionalExtension};

use crate::{PoqtError, Result};

/// Reads all config key-value pairs from the DB.
pub fn get_config(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT key, value FROM config ORDER BY key")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Reads one config value by key, if present.
pub fn get_config_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    Ok(conn
        .query_row("SELECT value FROM config WHERE key = ?1", params![key], |row| {
            row.get::<_, String>(0)
        })
        .optional()?)
}

/// Sets one config key (insert or replace).
pub fn set_config(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO config (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = ?2",
        params![key, value],
    )?;
    Ok(())
}

/// Sets a key only when it is absent. Returns whether it was written.
pub fn set_config_default(conn: &Connection, key: &str, value: &str) -> Result<bool> {
    let n = conn.execute(
        "INSERT INTO config (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO NOTHING",
        params![key, value],
    )?;
    Ok(n > 0)
}

/// Returns the counter stored under `key` (starting at 1) and bumps it.
/// Values handed out are never handed out again, even after deletes.
pub(crate) fn next_id(conn: &Connection, key: &str) -> Result<i64> {
    let current: i64 = match get_config_value(conn, key)? {
        Some(v) => v.trim().parse().map_err(|_| {
            PoqtError::Storage(format!("id counter {} holds '{}', not an integer", key, v))
        })?,
        None => 1,
    };
    set_config(conn, key, &(current + 1).to_string())?;
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn set_and_get_round_trip() {
        let conn = open_in_memory().unwrap();
        set_config(&conn, "urgency.mid_threshold", "0.5").unwrap();
        assert_eq!(
            get_config_value(&conn, "urgency.mid_threshold").unwrap().as_deref(),
            Some("0.5")
        );
        set_config(&conn, "urgency.mid_threshold", "0.45").unwrap();
        assert_eq!(
            get_config_value(&conn, "urgency.mid_threshold").unwrap().as_deref(),
            Some("0.45")
        );
    }

    #[test]
    fn default_does_not_overwrite() {
        let conn = open_in_memory().unwrap();
        assert!(set_config_default(&conn, "k", "first").unwrap());
        assert!(!set_config_default(&conn, "k", "second").unwrap());
        assert_eq!(get_config_value(&conn, "k").unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn next_id_is_monotonic() {
        let conn = open_in_memory().unwrap();
        assert_eq!(next_id(&conn, "c").unwrap(), 1);
        assert_eq!(next_id(&conn, "c").unwrap(), 2);
        assert_eq!(next_id(&conn, "other").unwrap(), 1);
    }

    #[test]
    fn corrupt_counter_is_a_storage_error() {
        let conn = open_in_memory().unwrap();
        set_config(&conn, "c", "seven").unwrap();
        let err = next_id(&conn, "c").unwrap_err();
        assert!(matches!(err, PoqtError::Storage(_)));
        assert!(err.to_string().contains("seven"));
        assert_eq!(get_config_value(&conn, "c").unwrap().as_deref(), Some("seven"));
    }
}
