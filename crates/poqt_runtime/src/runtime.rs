//! Composition root: opens the store, loads configuration and wires the
//! scheduler, alarm service, dispatcher and list manager together.

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;

use poqt_core::db::{self, SqliteStore};
use poqt_core::{Clock, PoqtError, Result, SystemClock, TaskStore};

use crate::config::{keys, PoqtConfig};
use crate::list_manager::{ListManager, ManagerContext};
use crate::list_view::ListKey;
use crate::notify::Notifier;
use crate::scheduler::{
    reminder_channel, AlarmService, ReloadSummary, ReminderDispatcher, ReminderRx,
    ReminderScheduler, TokioAlarmService,
};

pub struct Runtime {
    config: PoqtConfig,
    store: Arc<SqliteStore>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<ReminderScheduler>,
    manager: ListManager,
    reminders: Option<ReminderRx>,
}

impl Runtime {
    /// Open (creating if needed) the database under `data_dir` with the
    /// system clock and in-process alarms. Must be called inside a tokio
    /// runtime.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let store = SqliteStore::open(data_dir)?;
        Self::with_clock(store, data_dir, Arc::new(SystemClock))
    }

    pub fn with_clock(store: SqliteStore, data_dir: &Path, clock: Arc<dyn Clock>) -> Result<Self> {
        let (tx, rx) = reminder_channel();
        let alarms = Arc::new(TokioAlarmService::new(tx, clock.clone())?);
        let mut runtime = Self::with_parts(store, data_dir, clock, alarms)?;
        runtime.reminders = Some(rx);
        Ok(runtime)
    }

    /// Wire a runtime around a caller-supplied alarm service. No reminder
    /// channel is attached, so [`Runtime::spawn_dispatcher`] fails.
    pub fn with_parts(
        store: SqliteStore,
        data_dir: &Path,
        clock: Arc<dyn Clock>,
        alarms: Arc<dyn AlarmService>,
    ) -> Result<Self> {
        let config = store.with_conn(|conn| PoqtConfig::load(conn, data_dir))?;
        let store = Arc::new(store);
        let dyn_store: Arc<dyn TaskStore> = store.clone();

        let scheduler = Arc::new(ReminderScheduler::new(
            dyn_store.clone(),
            alarms,
            clock.clone(),
        ));
        let context = ManagerContext::new(config.urgency.clone(), clock.clone())
            .with_defaults(config.default_priority, config.default_reminder);
        let mut manager = ListManager::new(dyn_store, scheduler.clone(), context);

        if let Some(saved) = &config.selected_list {
            match saved.parse::<ListKey>() {
                Ok(key) => {
                    manager.select(key)?;
                }
                Err(e) => tracing::warn!(error = %e, "ignoring saved list selection"),
            }
        }

        tracing::debug!(data_dir = %data_dir.display(), "runtime ready");
        Ok(Self {
            config,
            store,
            clock,
            scheduler,
            manager,
            reminders: None,
        })
    }

    pub fn config(&self) -> &PoqtConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    pub fn scheduler(&self) -> &Arc<ReminderScheduler> {
        &self.scheduler
    }

    pub fn manager(&self) -> &ListManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ListManager {
        &mut self.manager
    }

    /// Boot signal: re-arm every pending reminder from storage.
    pub fn reload_all(&self) -> Result<ReloadSummary> {
        self.scheduler.reload_all()
    }

    /// Start consuming fired reminders. Only one dispatcher per runtime.
    pub fn spawn_dispatcher(&mut self, notifier: Arc<dyn Notifier>) -> Result<JoinHandle<()>> {
        let rx = self.reminders.take().ok_or_else(|| {
            PoqtError::Scheduling("reminder dispatcher already started".to_string())
        })?;
        let dispatcher = ReminderDispatcher::new(
            self.store.clone(),
            self.scheduler.clone(),
            notifier,
            self.clock.clone(),
        );
        Ok(tokio::spawn(dispatcher.run(rx)))
    }

    /// Remember the current selection for the next start.
    pub fn save_selection(&self) -> Result<()> {
        let key = self.manager.selected_key().to_string();
        self.store
            .with_conn(|conn| db::set_config(conn, keys::SELECTED_LIST, &key))
    }

    /// All rows of the config table.
    pub fn config_entries(&self) -> Result<Vec<(String, String)>> {
        self.store.with_conn(db::get_config)
    }

    pub fn config_value(&self, key: &str) -> Result<Option<String>> {
        self.store.with_conn(|conn| db::get_config_value(conn, key))
    }

    /// Validate and persist one option. Takes effect on the next start.
    pub fn set_config_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut candidate = self.config.clone();
        if !candidate.apply(key, value)? {
            return Err(PoqtError::Config(format!("unknown option '{}'", key)));
        }
        candidate.validate()?;
        self.store
            .with_conn(|conn| db::set_config(conn, key, value.trim()))?;
        tracing::info!(key, value, "config updated");
        self.config = candidate;
        Ok(())
    }
}
