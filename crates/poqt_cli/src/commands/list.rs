//! `poqt list ...` and `poqt member ...`

use anyhow::{Result, bail};
use poqt_core::{TaskId, TaskStore};
use poqt_runtime::{ListKey, Runtime};
use serde_json::json;

use super::resolve_list;
use crate::cli::{ListAction, MemberAction};
use crate::output;

pub fn handle(runtime: &mut Runtime, action: ListAction) -> Result<()> {
    match action {
        ListAction::Add { name, render } => {
            let list = runtime.manager_mut().create_list(&name, render)?;
            output::success(&format!("Created list {} ({})", list.name, list.id), &list);
        }
        ListAction::Edit { list, name, render } => {
            let key = resolve_list(runtime.manager(), &list)?;
            let Some(id) = key.custom_id() else {
                bail!("the {} list cannot be edited", list);
            };
            let Some(current) = runtime.store().get_list(id)? else {
                bail!("no list with id {}", id);
            };
            let updated = runtime.manager_mut().edit_list(
                key,
                name.as_deref().unwrap_or(&current.name),
                render.unwrap_or(current.render_kind),
            )?;
            output::success(&format!("Updated list {}", updated.name), &updated);
        }
        ListAction::Rm { list } => {
            let key = resolve_list(runtime.manager(), &list)?;
            runtime.manager_mut().delete_list(key)?;
            runtime.save_selection()?;
            output::success(&format!("Deleted list {}", list), &json!({ "list": key }));
        }
        ListAction::Ls => ls(runtime)?,
    }
    Ok(())
}

fn ls(runtime: &Runtime) -> Result<()> {
    let manager = runtime.manager();
    let selected = manager.selected_key();
    let mut table = output::table();
    output::table_header(&mut table, &["", "Key", "Title", "Render", "Tasks"]);
    let mut items = Vec::new();
    for view in manager.lists()? {
        let count = manager.tasks_of(view.key)?.len();
        let is_selected = view.key == selected;
        table.add_row(vec![
            if is_selected { "*" } else { "" }.to_string(),
            view.key.to_string(),
            view.title.clone(),
            view.render_kind.as_str().to_string(),
            count.to_string(),
        ]);
        items.push(json!({
            "key": view.key.to_string(),
            "title": view.title,
            "render_kind": view.render_kind,
            "tasks": count,
            "selected": is_selected,
        }));
    }
    output::table_print(&table, "lists", &items);
    Ok(())
}

pub fn member(runtime: &mut Runtime, action: MemberAction) -> Result<()> {
    match action {
        MemberAction::Add { task, list } => {
            let key = resolve_list(runtime.manager(), &list)?;
            let added = runtime.manager_mut().add_to_list(TaskId(task), key)?;
            let done = format!("Added task {} to {}", task, list);
            membership_changed(task, key, added, &done, &format!("Task {} is already in {}", task, list));
        }
        MemberAction::Rm { task, list } => {
            let (key, removed) = match list.as_deref() {
                Some(name) => {
                    let key = resolve_list(runtime.manager(), name)?;
                    (key, runtime.manager_mut().remove_from_list(TaskId(task), key)?)
                }
                None => {
                    let key = runtime.manager().selected_key();
                    (key, runtime.manager_mut().remove_from_selected(TaskId(task))?)
                }
            };
            let label = list.unwrap_or_else(|| key.to_string());
            let done = format!("Removed task {} from {}", task, label);
            membership_changed(task, key, removed, &done, &format!("Task {} is not in {}", task, label));
        }
        MemberAction::Ls { task } => {
            let lists = runtime.manager().lists_for_task(TaskId(task))?;
            let mut table = output::table();
            output::table_header(&mut table, &["ID", "List", "Render"]);
            for list in &lists {
                table.add_row(vec![
                    list.id.to_string(),
                    list.name.clone(),
                    list.render_kind.as_str().to_string(),
                ]);
            }
            if lists.is_empty() && !output::is_json() {
                output::dim(&format!("  task {} is in no custom list", task));
            } else {
                output::table_print(&table, "memberships", &lists);
            }
        }
    }
    Ok(())
}

fn membership_changed(task: i64, key: ListKey, changed: bool, done: &str, unchanged: &str) {
    let data = json!({ "task_id": task, "list": key, "changed": changed });
    if changed {
        output::success(done, &data);
    } else {
        output::warning(unchanged);
    }
}
