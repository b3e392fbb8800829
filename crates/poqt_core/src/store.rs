//! Persistence seam for tasks, lists and membership.
//!
//! Every method is one logical write or read: implementations must either
//! apply a mutation completely or return an error with nothing changed.
//! `crate::db::SqliteStore` is the production implementation.

use crate::task::{ListId, RenderKind, Task, TaskDraft, TaskId, TaskList};
use crate::Result;

pub trait TaskStore: Send + Sync {
    /// Insert a task with a freshly allocated, never reused id.
    fn insert_task(&self, draft: &TaskDraft) -> Result<Task>;

    /// Insert a task and make it a member of `list` in one write. Fails with
    /// nothing inserted when the list does not exist.
    fn insert_task_in_list(&self, draft: &TaskDraft, list: ListId) -> Result<Task>;

    /// Overwrite the editable fields of an existing task. `Ok(None)` when the
    /// id is unknown.
    fn update_task(&self, id: TaskId, draft: &TaskDraft) -> Result<Option<Task>>;

    /// Set the completion flag. `Ok(None)` when the id is unknown.
    fn set_completed(&self, id: TaskId, completed: bool) -> Result<Option<Task>>;

    /// Delete a task and its membership rows. `Ok(false)` when unknown.
    fn delete_task(&self, id: TaskId) -> Result<bool>;

    fn get_task(&self, id: TaskId) -> Result<Option<Task>>;

    /// Every task, ordered by id.
    fn all_tasks(&self) -> Result<Vec<Task>>;

    /// Members of a custom list, ordered by id.
    fn tasks_in_list(&self, list: ListId) -> Result<Vec<Task>>;

    /// Incomplete tasks with a due date and a reminder selection other than none.
    fn pending_reminders(&self) -> Result<Vec<Task>>;

    fn insert_list(&self, name: &str, render_kind: RenderKind) -> Result<TaskList>;

    /// `Ok(None)` when the id is unknown.
    fn update_list(&self, id: ListId, name: &str, render_kind: RenderKind)
        -> Result<Option<TaskList>>;

    /// Delete a list and its membership rows; never its tasks.
    fn delete_list(&self, id: ListId) -> Result<bool>;

    fn get_list(&self, id: ListId) -> Result<Option<TaskList>>;

    /// Custom lists in creation order.
    fn lists(&self) -> Result<Vec<TaskList>>;

    /// `Ok(false)` when the pair already exists.
    fn add_membership(&self, list: ListId, task: TaskId) -> Result<bool>;

    /// `Ok(false)` when the pair did not exist.
    fn remove_membership(&self, list: ListId, task: TaskId) -> Result<bool>;

    /// Custom lists the task belongs to, in creation order.
    fn lists_for_task(&self, task: TaskId) -> Result<Vec<TaskList>>;
}
