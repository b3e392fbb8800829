//! `poqt show|next|prev|select`

use anyhow::Result;
use poqt_core::{RankedTask, RenderKind};
use poqt_runtime::{ListView, Runtime};
use serde::Serialize;

use super::resolve_list;
use crate::due::format_due;
use crate::output;

#[derive(Serialize)]
struct Row<'a> {
    #[serde(flatten)]
    ranked: &'a RankedTask,
    lists: Vec<String>,
}

pub fn show(runtime: &Runtime, list: Option<&str>) -> Result<()> {
    let manager = runtime.manager();
    let (view, tasks) = match list {
        Some(name) => {
            let key = resolve_list(manager, name)?;
            let view = manager
                .lists()?
                .into_iter()
                .find(|v| v.key == key)
                .unwrap_or_else(ListView::active);
            let tasks = manager.tasks_of(key)?;
            (view, tasks)
        }
        None => (manager.selected_list()?, manager.selected_tasks()?),
    };
    print_tasks(runtime, &view, &tasks)
}

fn print_tasks(runtime: &Runtime, view: &ListView, tasks: &[RankedTask]) -> Result<()> {
    output::header(&format!("{} ({})", view.title, tasks.len()));
    if tasks.is_empty() && !output::is_json() {
        output::dim("  nothing here");
        return Ok(());
    }
    let colored = view.render_kind == RenderKind::Colored;
    let mut table = output::table();
    output::table_header(&mut table, &["ID", "Task", "Due", "Priority", "Urgency", "Lists"]);
    let mut rows = Vec::with_capacity(tasks.len());
    for ranked in tasks {
        let task = &ranked.task;
        let lists: Vec<String> = runtime
            .manager()
            .lists_for_task(task.id)?
            .into_iter()
            .map(|l| l.name)
            .collect();
        let band = ranked.urgency.band;
        table.add_row(vec![
            output::band_cell(&task.id.to_string(), band, colored),
            output::band_cell(&task.description, band, colored),
            output::band_cell(&task.due.map(format_due).unwrap_or_default(), band, colored),
            output::band_cell(task.priority.as_str(), band, colored),
            output::band_cell(band.as_str(), band, colored),
            output::band_cell(&lists.join(", "), band, colored),
        ]);
        rows.push(Row { ranked, lists });
    }
    output::table_print(&table, &view.title, &rows);
    Ok(())
}

fn selected(runtime: &Runtime, view: &ListView) -> Result<()> {
    runtime.save_selection()?;
    let actions = view.category().task_actions();
    output::success(
        &format!("Selected {}", view.title),
        &serde_json::json!({ "list": view.key, "title": view.title, "actions": actions }),
    );
    Ok(())
}

pub fn cycle(runtime: &mut Runtime, forward: bool) -> Result<()> {
    let view = if forward {
        runtime.manager_mut().cycle_next()?
    } else {
        runtime.manager_mut().cycle_previous()?
    };
    selected(runtime, &view)
}

pub fn select(runtime: &mut Runtime, list: &str) -> Result<()> {
    let key = resolve_list(runtime.manager(), list)?;
    let view = runtime.manager_mut().select(key)?;
    selected(runtime, &view)
}
