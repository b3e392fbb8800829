//! Row-level access to the `task` table.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::config::next_id;
use crate::ordinal::{decode, Ordinal};
use crate::task::{Task, TaskDraft, TaskId};
use crate::{PoqtError, Result};

const NEXT_TASK_ID_KEY: &str = "task:next_id";

const COLUMNS: &str = "id, description, due_date, priority_ordinal, reminder_ordinal, completed";

/// Raw column values; decoded into a `Task` outside the rusqlite closure so
/// ordinal failures surface as our own error type.
struct TaskRow {
    id: i64,
    description: String,
    due_date: Option<i64>,
    priority: i64,
    reminder: i64,
    completed: bool,
}

impl TaskRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            description: row.get(1)?,
            due_date: row.get(2)?,
            priority: row.get(3)?,
            reminder: row.get(4)?,
            completed: row.get(5)?,
        })
    }

    fn into_task(self) -> Result<Task> {
        let due = self
            .due_date
            .map(|ms| {
                DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| {
                    PoqtError::Storage(format!("task {} has out-of-range due_date {}", self.id, ms))
                })
            })
            .transpose()?;
        Ok(Task {
            id: TaskId(self.id),
            description: self.description,
            due,
            priority: decode(self.priority)?,
            reminder: decode(self.reminder)?,
            completed: self.completed,
        })
    }
}

fn collect(conn: &Connection, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(args, TaskRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(TaskRow::into_task).collect()
}

pub(crate) fn insert(conn: &Connection, draft: &TaskDraft) -> Result<Task> {
    let id = next_id(conn, NEXT_TASK_ID_KEY)?;
    conn.execute(
        "INSERT INTO task (id, description, due_date, priority_ordinal, reminder_ordinal, completed) VALUES (?1, ?2, ?3, ?4, ?5, 0)",
        params![
            id,
            draft.description,
            draft.due.map(|d| d.timestamp_millis()),
            draft.priority.to_ordinal(),
            draft.reminder.to_ordinal(),
        ],
    )?;
    Ok(Task {
        id: TaskId(id),
        description: draft.description.clone(),
        due: draft.due,
        priority: draft.priority,
        reminder: draft.reminder,
        completed: false,
    })
}

pub(crate) fn get(conn: &Connection, id: TaskId) -> Result<Option<Task>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM task WHERE id = ?1", COLUMNS),
            params![id.0],
            TaskRow::from_row,
        )
        .optional()?;
    row.map(TaskRow::into_task).transpose()
}

pub(crate) fn update(conn: &Connection, id: TaskId, draft: &TaskDraft) -> Result<bool> {
    let n = conn.execute(
        "UPDATE task SET description = ?1, due_date = ?2, priority_ordinal = ?3, reminder_ordinal = ?4 WHERE id = ?5",
        params![
            draft.description,
            draft.due.map(|d| d.timestamp_millis()),
            draft.priority.to_ordinal(),
            draft.reminder.to_ordinal(),
            id.0,
        ],
    )?;
    Ok(n > 0)
}

pub(crate) fn set_completed(conn: &Connection, id: TaskId, completed: bool) -> Result<bool> {
    let n = conn.execute(
        "UPDATE task SET completed = ?1 WHERE id = ?2",
        params![completed, id.0],
    )?;
    Ok(n > 0)
}

/// Deletes the task and its membership rows. Run inside a transaction.
pub(crate) fn delete(conn: &Connection, id: TaskId) -> Result<bool> {
    conn.execute("DELETE FROM membership WHERE task_id = ?1", params![id.0])?;
    let n = conn.execute("DELETE FROM task WHERE id = ?1", params![id.0])?;
    Ok(n > 0)
}

pub(crate) fn all(conn: &Connection) -> Result<Vec<Task>> {
    collect(conn, &format!("SELECT {} FROM task ORDER BY id", COLUMNS), [])
}

pub(crate) fn in_list(conn: &Connection, list_id: i64) -> Result<Vec<Task>> {
    collect(
        conn,
        "SELECT t.id, t.description, t.due_date, t.priority_ordinal, t.reminder_ordinal, t.completed
         FROM task t JOIN membership m ON m.task_id = t.id
         WHERE m.list_id = ?1 ORDER BY t.id",
        params![list_id],
    )
}

pub(crate) fn pending_reminders(conn: &Connection) -> Result<Vec<Task>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM task WHERE completed = 0 AND due_date IS NOT NULL AND reminder_ordinal <> ?1 ORDER BY due_date, id",
            COLUMNS
        ),
        params![crate::task::ReminderLead::None.to_ordinal()],
    )
}
