//! SQLite persistence under the data dir (default `~/.poqt`).
//!
//! - `poqt.db` + WAL: tasks, custom lists, membership, config.
//! - `logs/`: log output of long-running hosts.

mod config;
mod connection;
mod layout;
mod lists;
mod migrations;
mod sqlite_store;
mod tasks;

pub use config::{get_config, get_config_value, set_config, set_config_default};
pub use connection::{open_db_at, open_in_memory};
pub use layout::{ensure_data_dir_at, logs_dir, LOGS_DIR, POQT_DB};
pub use migrations::{run_all as run_migrations, ORDINAL_VERSION_KEY};
pub use sqlite_store::SqliteStore;
