//! Application metadata constants

pub const NAME: &str = "poqt";
pub const DISPLAY_NAME: &str = "POQTList";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = "Personal task lists with urgency ranking and due-date reminders";

/// Directory name for poqt data under the home directory
pub const DATA_DIR: &str = ".poqt";
/// Env var that overrides the data directory
pub const DATA_DIR_ENV: &str = "POQT_DATA_DIR";
/// Log file written by `poqt watch`, relative to the logs dir
pub const WATCH_LOG_FILE: &str = "poqt.log";

/// Title of the implicit list holding every incomplete task
pub const ACTIVE_LIST_TITLE: &str = "Active";
/// Title of the implicit list holding every completed task
pub const COMPLETED_LIST_TITLE: &str = "Completed";
