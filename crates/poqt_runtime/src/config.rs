//! Runtime configuration for poqt
//!
//! Layered as built-in defaults, then the `config` table of the database,
//! then environment variables.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use poqt_constant::app;
use poqt_core::db::{get_config, set_config_default};
use poqt_core::urgency::keys as urgency_keys;
use poqt_core::{PoqtError, Priority, ReminderLead, Result, UrgencyConfig};

/// Keys of the `config` table that are not urgency options.
pub mod keys {
    pub const DEFAULT_PRIORITY: &str = "task.default_priority";
    pub const DEFAULT_REMINDER: &str = "task.default_reminder";
    pub const SELECTED_LIST: &str = "ui.selected_list";
    pub const PREFS_LOADED: &str = "prefs.loaded";
}

/// Environment variables that override an urgency option.
const ENV_OVERRIDES: [(&str, &str); 6] = [
    ("POQT_TIME_WINDOW_MINUTES", urgency_keys::TIME_WINDOW_MINUTES),
    ("POQT_LOW_PRIORITY_WEIGHT", urgency_keys::LOW_PRIORITY_WEIGHT),
    ("POQT_NORMAL_PRIORITY_WEIGHT", urgency_keys::NORMAL_PRIORITY_WEIGHT),
    ("POQT_HIGH_PRIORITY_WEIGHT", urgency_keys::HIGH_PRIORITY_WEIGHT),
    ("POQT_MID_THRESHOLD", urgency_keys::MID_THRESHOLD),
    ("POQT_HIGH_THRESHOLD", urgency_keys::HIGH_THRESHOLD),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PoqtConfig {
    /// Directory holding `poqt.db` and `logs/`
    pub data_dir: PathBuf,
    pub urgency: UrgencyConfig,
    /// Priority for new tasks when none is given
    pub default_priority: Priority,
    /// Reminder lead for new tasks when none is given
    pub default_reminder: ReminderLead,
    /// Persisted list selection, as written by `ListKey`'s `Display`
    pub selected_list: Option<String>,
}

impl PoqtConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            urgency: UrgencyConfig::default(),
            default_priority: Priority::default(),
            default_reminder: ReminderLead::default(),
            selected_list: None,
        }
    }

    pub fn with_urgency(mut self, urgency: UrgencyConfig) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn with_default_priority(mut self, priority: Priority) -> Self {
        self.default_priority = priority;
        self
    }

    pub fn with_default_reminder(mut self, reminder: ReminderLead) -> Self {
        self.default_reminder = reminder;
        self
    }

    /// `explicit`, else `POQT_DATA_DIR`, else `~/.poqt`.
    pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = explicit {
            return Ok(dir);
        }
        if let Some(dir) = std::env::var_os(app::DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        dirs::home_dir()
            .map(|home| home.join(app::DATA_DIR))
            .ok_or_else(|| {
                PoqtError::Config(format!(
                    "cannot locate a home directory; set {}",
                    app::DATA_DIR_ENV
                ))
            })
    }

    /// Load from the database and the process environment.
    pub fn load(conn: &Connection, data_dir: &Path) -> Result<Self> {
        Self::load_with(conn, data_dir, |key| std::env::var(key).ok())
    }

    /// Like [`PoqtConfig::load`] with an injectable environment lookup.
    pub fn load_with(
        conn: &Connection,
        data_dir: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = Self::new(data_dir.to_path_buf());
        write_defaults(conn)?;
        for (key, value) in get_config(conn)? {
            config.apply(&key, &value)?;
        }
        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = env(var) {
                config
                    .apply(key, &value)
                    .map_err(|e| PoqtError::Config(format!("{}: {}", var, e)))?;
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Set one option from its string form. Returns `false` for keys this
    /// config does not own.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<bool> {
        if self.urgency.apply(key, value)? {
            return Ok(true);
        }
        match key {
            keys::DEFAULT_PRIORITY => {
                self.default_priority = value
                    .parse()
                    .map_err(|e| PoqtError::Config(format!("{}: {}", key, e)))?;
            }
            keys::DEFAULT_REMINDER => {
                self.default_reminder = value
                    .parse()
                    .map_err(|e| PoqtError::Config(format!("{}: {}", key, e)))?;
            }
            keys::SELECTED_LIST => self.selected_list = Some(value.to_string()),
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        self.urgency.validate()
    }

    /// Every option this config writes to the `config` table.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.urgency.to_pairs();
        pairs.push((keys::DEFAULT_PRIORITY, self.default_priority.to_string()));
        pairs.push((keys::DEFAULT_REMINDER, self.default_reminder.to_string()));
        pairs
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(poqt_core::db::POQT_DB)
    }

    pub fn logs_dir(&self) -> PathBuf {
        poqt_core::db::logs_dir(&self.data_dir)
    }
}

/// On first open, record the built-in defaults so `config ls` shows them.
fn write_defaults(conn: &Connection) -> Result<()> {
    if poqt_core::db::get_config_value(conn, keys::PREFS_LOADED)?.is_some() {
        return Ok(());
    }
    for (key, value) in PoqtConfig::new(PathBuf::new()).to_pairs() {
        set_config_default(conn, key, &value)?;
    }
    set_config_default(conn, keys::PREFS_LOADED, "true")?;
    tracing::debug!("default preferences written");
    Ok(())
}
