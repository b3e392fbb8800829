//! Command dispatch.

pub mod config;
pub mod list;
pub mod task;
pub mod view;
pub mod watch;

use anyhow::{Result, anyhow};
use poqt_core::{ListId, TaskId};
use poqt_observability::ObservabilityConfig;
use poqt_runtime::{ListKey, ListManager, PoqtConfig, Runtime};

use crate::cli::{Cli, Command};
use crate::output;

pub async fn handle(cli: Cli) -> Result<()> {
    let data_dir = PoqtConfig::resolve_data_dir(cli.data_dir)?;

    if let Command::Watch { rescan } = cli.command {
        return watch::handle(&data_dir, cli.verbose, rescan).await;
    }

    init_logging(cli.verbose);
    let mut runtime = Runtime::open(&data_dir)?;

    match cli.command {
        Command::Add {
            description,
            fields,
        } => task::add(&mut runtime, description, fields),
        Command::Edit {
            id,
            description,
            fields,
            no_due,
        } => task::edit(&mut runtime, TaskId(id), description, fields, no_due),
        Command::Done { id } => task::done(&mut runtime, TaskId(id)),
        Command::Restore { id } => task::restore(&mut runtime, TaskId(id)),
        Command::Rm { id } => task::remove(&mut runtime, TaskId(id)),
        Command::Show { list } => view::show(&runtime, list.as_deref()),
        Command::Next => view::cycle(&mut runtime, true),
        Command::Prev => view::cycle(&mut runtime, false),
        Command::Select { list } => view::select(&mut runtime, &list),
        Command::List { action } => list::handle(&mut runtime, action),
        Command::Member { action } => list::member(&mut runtime, action),
        Command::Config { action } => config::handle(&mut runtime, action),
        Command::Watch { .. } => Ok(()),
    }
}

/// One-shot commands log warnings only, unless `--verbose`.
fn init_logging(verbose: bool) {
    let mut config = ObservabilityConfig::from_env();
    if verbose {
        config = config.with_log_level("debug");
    } else if config.log_level.is_none() {
        config = config.with_log_level("warn");
    }
    if let Err(e) = poqt_observability::init(config) {
        output::warning(&format!("Logging init failed (continuing): {}", e));
    }
}

/// `active`, `completed`, a numeric list id or a custom list name
/// (case-insensitive).
pub fn resolve_list(manager: &ListManager, input: &str) -> Result<ListKey> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "active" => return Ok(ListKey::Active),
        "completed" => return Ok(ListKey::Completed),
        _ => {}
    }
    let views = manager.lists()?;
    if let Ok(id) = input.parse::<i64>() {
        let key = ListKey::Custom(ListId(id));
        if views.iter().any(|v| v.key == key) {
            return Ok(key);
        }
    }
    let folded = input.to_lowercase();
    views
        .into_iter()
        .find(|v| v.key.custom_id().is_some() && v.title.to_lowercase() == folded)
        .map(|v| v.key)
        .ok_or_else(|| anyhow!("no list named '{}'", input))
}
