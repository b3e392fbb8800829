//! Shared fixtures: fake alarms, a capturing notifier and a store whose
//! writes can be made to fail.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use poqt_core::db::SqliteStore;
use poqt_core::{
    Clock, ListId, ManualClock, PoqtError, RenderKind, Result, Task, TaskDraft, TaskId, TaskList,
    TaskStore, UrgencyConfig,
};
use poqt_runtime::{
    AlarmHandle, AlarmService, ListManager, ManagerContext, Notification, Notifier,
    ReminderPayload, ReminderScheduler,
};

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlarmCall {
    Register(TaskId, DateTime<Utc>),
    Cancel(TaskId),
}

#[derive(Default)]
pub struct FakeAlarms {
    calls: Mutex<Vec<AlarmCall>>,
    live: Mutex<Vec<ReminderPayload>>,
}

impl FakeAlarms {
    pub fn calls(&self) -> Vec<AlarmCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn registrations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, AlarmCall::Register(..)))
            .count()
    }

    /// Payloads currently registered and not cancelled.
    pub fn live(&self) -> Vec<ReminderPayload> {
        self.live.lock().unwrap().clone()
    }

    pub fn is_live(&self, task_id: TaskId) -> bool {
        self.live().iter().any(|p| p.task_id == task_id)
    }
}

impl AlarmService for FakeAlarms {
    fn register(
        &self,
        task_id: TaskId,
        fire_at: DateTime<Utc>,
        payload: ReminderPayload,
    ) -> Result<AlarmHandle> {
        self.calls
            .lock()
            .unwrap()
            .push(AlarmCall::Register(task_id, fire_at));
        let mut live = self.live.lock().unwrap();
        live.retain(|p| p.task_id != task_id);
        live.push(payload);
        Ok(AlarmHandle {
            task_id,
            fire_at,
            generation: 0,
        })
    }

    fn cancel(&self, task_id: TaskId) -> bool {
        self.calls.lock().unwrap().push(AlarmCall::Cancel(task_id));
        let mut live = self.live.lock().unwrap();
        let before = live.len();
        live.retain(|p| p.task_id != task_id);
        live.len() != before
    }
}

#[derive(Default)]
pub struct CapturingNotifier {
    pub seen: Mutex<Vec<Notification>>,
}

impl CapturingNotifier {
    pub fn seen(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for CapturingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.seen.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// `SqliteStore` whose mutations fail while `fail_writes` is set.
pub struct FlakyStore {
    inner: SqliteStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::in_memory().unwrap(),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PoqtError::Storage("disk full".to_string()));
        }
        Ok(())
    }
}

impl TaskStore for FlakyStore {
    fn insert_task(&self, draft: &TaskDraft) -> Result<Task> {
        self.check()?;
        self.inner.insert_task(draft)
    }

    fn insert_task_in_list(&self, draft: &TaskDraft, list: ListId) -> Result<Task> {
        self.check()?;
        self.inner.insert_task_in_list(draft, list)
    }

    fn update_task(&self, id: TaskId, draft: &TaskDraft) -> Result<Option<Task>> {
        self.check()?;
        self.inner.update_task(id, draft)
    }

    fn set_completed(&self, id: TaskId, completed: bool) -> Result<Option<Task>> {
        self.check()?;
        self.inner.set_completed(id, completed)
    }

    fn delete_task(&self, id: TaskId) -> Result<bool> {
        self.check()?;
        self.inner.delete_task(id)
    }

    fn get_task(&self, id: TaskId) -> Result<Option<Task>> {
        self.inner.get_task(id)
    }

    fn all_tasks(&self) -> Result<Vec<Task>> {
        self.inner.all_tasks()
    }

    fn tasks_in_list(&self, list: ListId) -> Result<Vec<Task>> {
        self.inner.tasks_in_list(list)
    }

    fn pending_reminders(&self) -> Result<Vec<Task>> {
        self.inner.pending_reminders()
    }

    fn insert_list(&self, name: &str, render_kind: RenderKind) -> Result<TaskList> {
        self.check()?;
        self.inner.insert_list(name, render_kind)
    }

    fn update_list(
        &self,
        id: ListId,
        name: &str,
        render_kind: RenderKind,
    ) -> Result<Option<TaskList>> {
        self.check()?;
        self.inner.update_list(id, name, render_kind)
    }

    fn delete_list(&self, id: ListId) -> Result<bool> {
        self.check()?;
        self.inner.delete_list(id)
    }

    fn get_list(&self, id: ListId) -> Result<Option<TaskList>> {
        self.inner.get_list(id)
    }

    fn lists(&self) -> Result<Vec<TaskList>> {
        self.inner.lists()
    }

    fn add_membership(&self, list: ListId, task: TaskId) -> Result<bool> {
        self.check()?;
        self.inner.add_membership(list, task)
    }

    fn remove_membership(&self, list: ListId, task: TaskId) -> Result<bool> {
        self.check()?;
        self.inner.remove_membership(list, task)
    }

    fn lists_for_task(&self, task: TaskId) -> Result<Vec<TaskList>> {
        self.inner.lists_for_task(task)
    }
}

/// Everything a manager-level test needs, wired around fakes.
pub struct Harness {
    pub store: Arc<FlakyStore>,
    pub alarms: Arc<FakeAlarms>,
    pub clock: Arc<ManualClock>,
    pub scheduler: Arc<ReminderScheduler>,
    pub manager: ListManager,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_urgency(UrgencyConfig::default())
    }

    pub fn with_urgency(urgency: UrgencyConfig) -> Self {
        let store = Arc::new(FlakyStore::new());
        let alarms = Arc::new(FakeAlarms::default());
        let clock = Arc::new(ManualClock::new(start()));
        let dyn_store: Arc<dyn TaskStore> = store.clone();
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let scheduler = Arc::new(ReminderScheduler::new(
            dyn_store.clone(),
            alarms.clone(),
            dyn_clock.clone(),
        ));
        let manager = ListManager::new(
            dyn_store,
            scheduler.clone(),
            ManagerContext::new(urgency, dyn_clock),
        );
        Self {
            store,
            alarms,
            clock,
            scheduler,
            manager,
        }
    }

    /// A fresh scheduler over the same store and alarms, as after a restart.
    pub fn restarted_scheduler(&self) -> ReminderScheduler {
        ReminderScheduler::new(self.store.clone(), self.alarms.clone(), self.clock.clone())
    }
}
