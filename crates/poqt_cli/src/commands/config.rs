//! `poqt config` subcommands.

use anyhow::{Result, anyhow};
use poqt_runtime::Runtime;
use serde_json::json;

use crate::cli::ConfigAction;
use crate::output;

pub fn handle(runtime: &mut Runtime, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Ls => {
            let entries = runtime.config_entries()?;
            let mut table = output::table();
            output::table_header(&mut table, &["Key", "Value"]);
            for (key, value) in &entries {
                table.add_row(vec![key.clone(), value.clone()]);
            }
            let items: Vec<_> = entries
                .iter()
                .map(|(key, value)| json!({ "key": key, "value": value }))
                .collect();
            output::table_print(&table, "config", &items);
        }
        ConfigAction::Get { key } => {
            let value = runtime
                .config_value(&key)?
                .ok_or_else(|| anyhow!("option '{}' is not set", key))?;
            output::kv(&key, &value);
        }
        ConfigAction::Set { key, value } => {
            runtime.set_config_value(&key, &value)?;
            output::success(
                &format!("Set {} = {}", key, value.trim()),
                &json!({ "key": key, "value": value.trim() }),
            );
        }
    }
    Ok(())
}
