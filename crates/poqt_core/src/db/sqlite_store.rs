//! `TaskStore` backed by one SQLite connection.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use super::{connection, lists, tasks};
use crate::store::TaskStore;
use crate::task::{ListId, RenderKind, Task, TaskDraft, TaskId, TaskList};
use crate::{PoqtError, Result};

/// The connection mutex is held for one statement or transaction only.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (creating if needed) the DB under `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        Ok(Self::new(connection::open_db_at(data_dir)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(connection::open_in_memory()?))
    }

    /// Run `f` with the connection, for config-table access.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        f(&*self.lock()?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PoqtError::Storage("connection lock poisoned".to_string()))
    }

    /// Run `f` inside a transaction; rolled back unless `f` succeeds.
    fn in_tx<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let out = f(&*tx)?;
        tx.commit()?;
        Ok(out)
    }
}

impl TaskStore for SqliteStore {
    fn insert_task(&self, draft: &TaskDraft) -> Result<Task> {
        self.in_tx(|conn| tasks::insert(conn, draft))
    }

    fn insert_task_in_list(&self, draft: &TaskDraft, list: ListId) -> Result<Task> {
        self.in_tx(|conn| {
            if lists::get(conn, list)?.is_none() {
                return Err(PoqtError::list_not_found(list.0));
            }
            let task = tasks::insert(conn, draft)?;
            lists::add_member(conn, list, task.id)?;
            Ok(task)
        })
    }

    fn update_task(&self, id: TaskId, draft: &TaskDraft) -> Result<Option<Task>> {
        self.in_tx(|conn| {
            if !tasks::update(conn, id, draft)? {
                return Ok(None);
            }
            tasks::get(conn, id)
        })
    }

    fn set_completed(&self, id: TaskId, completed: bool) -> Result<Option<Task>> {
        self.in_tx(|conn| {
            if !tasks::set_completed(conn, id, completed)? {
                return Ok(None);
            }
            tasks::get(conn, id)
        })
    }

    fn delete_task(&self, id: TaskId) -> Result<bool> {
        self.in_tx(|conn| tasks::delete(conn, id))
    }

    fn get_task(&self, id: TaskId) -> Result<Option<Task>> {
        tasks::get(&*self.lock()?, id)
    }

    fn all_tasks(&self) -> Result<Vec<Task>> {
        tasks::all(&*self.lock()?)
    }

    fn tasks_in_list(&self, list: ListId) -> Result<Vec<Task>> {
        tasks::in_list(&*self.lock()?, list.0)
    }

    fn pending_reminders(&self) -> Result<Vec<Task>> {
        tasks::pending_reminders(&*self.lock()?)
    }

    fn insert_list(&self, name: &str, render_kind: RenderKind) -> Result<TaskList> {
        self.in_tx(|conn| lists::insert(conn, name, render_kind))
    }

    fn update_list(
        &self,
        id: ListId,
        name: &str,
        render_kind: RenderKind,
    ) -> Result<Option<TaskList>> {
        self.in_tx(|conn| {
            if !lists::update(conn, id, name, render_kind)? {
                return Ok(None);
            }
            lists::get(conn, id)
        })
    }

    fn delete_list(&self, id: ListId) -> Result<bool> {
        self.in_tx(|conn| lists::delete(conn, id))
    }

    fn get_list(&self, id: ListId) -> Result<Option<TaskList>> {
        lists::get(&*self.lock()?, id)
    }

    fn lists(&self) -> Result<Vec<TaskList>> {
        lists::all(&*self.lock()?)
    }

    fn add_membership(&self, list: ListId, task: TaskId) -> Result<bool> {
        lists::add_member(&*self.lock()?, list, task)
    }

    fn remove_membership(&self, list: ListId, task: TaskId) -> Result<bool> {
        lists::remove_member(&*self.lock()?, list, task)
    }

    fn lists_for_task(&self, task: TaskId) -> Result<Vec<TaskList>> {
        lists::for_task(&*self.lock()?, task)
    }
}
