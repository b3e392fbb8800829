//! `poqt add|edit|done|restore|rm`

use anyhow::Result;
use poqt_core::{Task, TaskDraft, TaskId};
use poqt_runtime::{ReminderState, Runtime};
use serde::Serialize;

use crate::cli::TaskFields;
use crate::due::{format_due, parse_due};
use crate::output;

#[derive(Serialize)]
struct TaskReport<'a> {
    task: &'a Task,
    reminder: ReminderState,
}

fn report(runtime: &Runtime, verb: &str, task: &Task) {
    let reminder = runtime.scheduler().state(task.id);
    let mut line = format!("{} task {}: {}", verb, task.id, task.description);
    if let Some(due) = task.due {
        line.push_str(&format!(" (due {})", format_due(due)));
    }
    output::success(&line, &TaskReport { task, reminder });
    if let ReminderState::Armed { fire_at } = reminder {
        output::dim(&format!("  reminder at {}", format_due(fire_at)));
    }
}

pub fn add(runtime: &mut Runtime, description: String, fields: TaskFields) -> Result<()> {
    let mut draft = runtime.manager().draft(description);
    if let Some(due) = fields.due.as_deref() {
        draft.due = Some(parse_due(due)?);
    }
    if let Some(priority) = fields.priority {
        draft.priority = priority;
    }
    if let Some(reminder) = fields.remind {
        draft.reminder = reminder;
    }
    let task = runtime.manager_mut().create_task_in_selected(draft)?;
    report(runtime, "Added", &task);
    Ok(())
}

pub fn edit(
    runtime: &mut Runtime,
    id: TaskId,
    description: Option<String>,
    fields: TaskFields,
    no_due: bool,
) -> Result<()> {
    let current = runtime.manager().get_task(id)?;
    let due = if no_due {
        None
    } else {
        match fields.due.as_deref() {
            Some(due) => Some(parse_due(due)?),
            None => current.due,
        }
    };
    let draft = TaskDraft {
        description: description.unwrap_or(current.description),
        due,
        priority: fields.priority.unwrap_or(current.priority),
        reminder: fields.remind.unwrap_or(current.reminder),
    };
    let task = runtime.manager_mut().edit_task(id, draft)?;
    report(runtime, "Updated", &task);
    Ok(())
}

pub fn done(runtime: &mut Runtime, id: TaskId) -> Result<()> {
    let task = runtime.manager_mut().complete_task(id)?;
    report(runtime, "Completed", &task);
    Ok(())
}

pub fn restore(runtime: &mut Runtime, id: TaskId) -> Result<()> {
    let task = runtime.manager_mut().restore_task(id)?;
    report(runtime, "Restored", &task);
    Ok(())
}

pub fn remove(runtime: &mut Runtime, id: TaskId) -> Result<()> {
    runtime.manager_mut().delete_task(id)?;
    output::success(
        &format!("Deleted task {}", id),
        &serde_json::json!({ "task_id": id }),
    );
    Ok(())
}
