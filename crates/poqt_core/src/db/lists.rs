//! Row-level access to `task_list` and `membership`.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::config::next_id;
use crate::ordinal::{decode, Ordinal};
use crate::task::{ListId, RenderKind, TaskId, TaskList};
use crate::Result;

const NEXT_LIST_ID_KEY: &str = "task_list:next_id";

fn read_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, i64)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn into_list((id, name, kind): (i64, String, i64)) -> Result<TaskList> {
    Ok(TaskList {
        id: ListId(id),
        name,
        render_kind: decode(kind)?,
    })
}

pub(crate) fn insert(conn: &Connection, name: &str, render_kind: RenderKind) -> Result<TaskList> {
    let id = next_id(conn, NEXT_LIST_ID_KEY)?;
    conn.execute(
        "INSERT INTO task_list (id, name, render_kind_ordinal) VALUES (?1, ?2, ?3)",
        params![id, name, render_kind.to_ordinal()],
    )?;
    Ok(TaskList {
        id: ListId(id),
        name: name.to_string(),
        render_kind,
    })
}

pub(crate) fn get(conn: &Connection, id: ListId) -> Result<Option<TaskList>> {
    let row = conn
        .query_row(
            "SELECT id, name, render_kind_ordinal FROM task_list WHERE id = ?1",
            params![id.0],
            read_row,
        )
        .optional()?;
    row.map(into_list).transpose()
}

pub(crate) fn update(conn: &Connection, id: ListId, name: &str, render_kind: RenderKind) -> Result<bool> {
    let n = conn.execute(
        "UPDATE task_list SET name = ?1, render_kind_ordinal = ?2 WHERE id = ?3",
        params![name, render_kind.to_ordinal(), id.0],
    )?;
    Ok(n > 0)
}

/// Deletes the list and its membership rows. Run inside a transaction.
pub(crate) fn delete(conn: &Connection, id: ListId) -> Result<bool> {
    conn.execute("DELETE FROM membership WHERE list_id = ?1", params![id.0])?;
    let n = conn.execute("DELETE FROM task_list WHERE id = ?1", params![id.0])?;
    Ok(n > 0)
}

pub(crate) fn all(conn: &Connection) -> Result<Vec<TaskList>> {
    let mut stmt = conn.prepare("SELECT id, name, render_kind_ordinal FROM task_list ORDER BY id")?;
    let rows = stmt
        .query_map([], read_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(into_list).collect()
}

pub(crate) fn for_task(conn: &Connection, task: TaskId) -> Result<Vec<TaskList>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.name, l.render_kind_ordinal FROM task_list l
         JOIN membership m ON m.list_id = l.id
         WHERE m.task_id = ?1 ORDER BY l.id",
    )?;
    let rows = stmt
        .query_map(params![task.0], read_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(into_list).collect()
}

pub(crate) fn add_member(conn: &Connection, list: ListId, task: TaskId) -> Result<bool> {
    let n = conn.execute(
        "INSERT INTO membership (list_id, task_id) VALUES (?1, ?2) ON CONFLICT DO NOTHING",
        params![list.0, task.0],
    )?;
    Ok(n > 0)
}

pub(crate) fn remove_member(conn: &Connection, list: ListId, task: TaskId) -> Result<bool> {
    let n = conn.execute(
        "DELETE FROM membership WHERE list_id = ?1 AND task_id = ?2",
        params![list.0, task.0],
    )?;
    Ok(n > 0)
}
