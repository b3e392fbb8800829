//! The list cycle, the current selection and every task/list mutation.
//!
//! Mutations persist first and only then touch reminders, so a failed write
//! never leaves an alarm behind.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use poqt_core::{
    Clock, ListId, PoqtError, Priority, RankedTask, ReminderLead, RenderKind, Result, Task,
    TaskDraft, TaskId, TaskList, TaskStore, UrgencyConfig,
};
use poqt_observability::store_span;

use crate::list_view::{ListCategory, ListKey, ListView};
use crate::scheduler::ReminderScheduler;

/// Preferences the manager works under.
#[derive(Clone)]
pub struct ManagerContext {
    pub urgency: UrgencyConfig,
    pub clock: Arc<dyn Clock>,
    pub default_priority: Priority,
    pub default_reminder: ReminderLead,
}

impl ManagerContext {
    pub fn new(urgency: UrgencyConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            urgency,
            clock,
            default_priority: Priority::default(),
            default_reminder: ReminderLead::default(),
        }
    }

    pub fn with_defaults(mut self, priority: Priority, reminder: ReminderLead) -> Self {
        self.default_priority = priority;
        self.default_reminder = reminder;
        self
    }
}

pub struct ListManager {
    store: Arc<dyn TaskStore>,
    scheduler: Arc<ReminderScheduler>,
    context: ManagerContext,
    selected: ListKey,
}

impl ListManager {
    pub fn new(
        store: Arc<dyn TaskStore>,
        scheduler: Arc<ReminderScheduler>,
        context: ManagerContext,
    ) -> Self {
        Self {
            store,
            scheduler,
            context,
            selected: ListKey::Active,
        }
    }

    pub fn context(&self) -> &ManagerContext {
        &self.context
    }

    pub fn scheduler(&self) -> &Arc<ReminderScheduler> {
        &self.scheduler
    }

    fn now(&self) -> DateTime<Utc> {
        self.context.clock.now()
    }

    /// A draft carrying the configured default priority and reminder.
    pub fn draft(&self, description: impl Into<String>) -> TaskDraft {
        TaskDraft::new(description)
            .with_priority(self.context.default_priority)
            .with_reminder(self.context.default_reminder)
    }

    // ---- lists and selection ----

    /// `[Active, Completed, custom lists in creation order]`
    pub fn lists(&self) -> Result<Vec<ListView>> {
        let mut views = vec![ListView::active(), ListView::completed()];
        views.extend(self.store.lists()?.iter().map(ListView::custom));
        Ok(views)
    }

    pub fn selected_key(&self) -> ListKey {
        self.selected
    }

    /// The selected view; a custom list deleted elsewhere resolves to Active.
    pub fn selected_list(&self) -> Result<ListView> {
        self.view(self.selected).map(|view| view.unwrap_or_else(ListView::active))
    }

    pub fn selected_title(&self) -> Result<String> {
        Ok(self.selected_list()?.title)
    }

    pub fn selected_category(&self) -> Result<ListCategory> {
        Ok(self.selected_list()?.category())
    }

    /// Select a list directly. Unknown custom lists fall back to Active.
    pub fn select(&mut self, key: ListKey) -> Result<ListView> {
        let view = self.view(key)?.unwrap_or_else(ListView::active);
        self.selected = view.key;
        Ok(view)
    }

    pub fn cycle_next(&mut self) -> Result<ListView> {
        self.cycle(1)
    }

    pub fn cycle_previous(&mut self) -> Result<ListView> {
        self.cycle(-1)
    }

    fn cycle(&mut self, step: isize) -> Result<ListView> {
        let views = self.lists()?;
        let len = views.len() as isize;
        let current = views
            .iter()
            .position(|v| v.key == self.selected)
            .unwrap_or(0) as isize;
        let view = views[(current + step).rem_euclid(len) as usize].clone();
        self.selected = view.key;
        Ok(view)
    }

    fn view(&self, key: ListKey) -> Result<Option<ListView>> {
        Ok(match key {
            ListKey::Active => Some(ListView::active()),
            ListKey::Completed => Some(ListView::completed()),
            ListKey::Custom(id) => self.store.get_list(id)?.as_ref().map(ListView::custom),
        })
    }

    /// Tasks of the selected list, classified now and in display order.
    pub fn selected_tasks(&self) -> Result<Vec<RankedTask>> {
        self.selected_list()?
            .ranked(self.store.as_ref(), self.now(), &self.context.urgency)
    }

    pub fn tasks_of(&self, key: ListKey) -> Result<Vec<RankedTask>> {
        let view = self.view(key)?.ok_or_else(|| not_found(key))?;
        view.ranked(self.store.as_ref(), self.now(), &self.context.urgency)
    }

    // ---- tasks ----

    pub fn get_task(&self, id: TaskId) -> Result<Task> {
        self.store
            .get_task(id)?
            .ok_or_else(|| PoqtError::task_not_found(id.0))
    }

    /// Create a task; it shows up in Active implicitly.
    pub fn create_task(&mut self, draft: TaskDraft) -> Result<Task> {
        let draft = draft.validated()?;
        let task = {
            let span = store_span!("create_task", 0);
            let _guard = span.enter();
            self.store.insert_task(&draft)?
        };
        tracing::info!(task.id = %task.id, "task created");
        self.scheduler.arm(&task);
        Ok(task)
    }

    /// Create a task in the selected list. On a custom list the task also
    /// becomes a member; the Completed list does not accept new tasks.
    pub fn create_task_in_selected(&mut self, draft: TaskDraft) -> Result<Task> {
        let view = self.selected_list()?;
        if !view.category().accepts_new_tasks() {
            return Err(PoqtError::InvalidOperation(format!(
                "cannot add a task to the {} list",
                view.title
            )));
        }
        match view.key {
            ListKey::Active | ListKey::Completed => self.create_task(draft),
            ListKey::Custom(list) => {
                let draft = draft.validated()?;
                let task = {
                    let span = store_span!("create_task", list.0);
                    let _guard = span.enter();
                    self.store.insert_task_in_list(&draft, list)?
                };
                tracing::info!(task.id = %task.id, list.id = %list, "task created in list");
                self.scheduler.arm(&task);
                Ok(task)
            }
        }
    }

    /// Replace a task's editable fields and re-arm its reminder.
    /// `completed` is kept as is.
    pub fn edit_task(&mut self, id: TaskId, draft: TaskDraft) -> Result<Task> {
        let draft = draft.validated()?;
        let task = {
            let span = store_span!("edit_task", id.0);
            let _guard = span.enter();
            self.store
                .update_task(id, &draft)?
                .ok_or_else(|| PoqtError::task_not_found(id.0))?
        };
        tracing::info!(task.id = %id, "task edited");
        self.scheduler.arm(&task);
        Ok(task)
    }

    /// Idempotent.
    pub fn complete_task(&mut self, id: TaskId) -> Result<Task> {
        let task = self.set_completed(id, true)?;
        self.scheduler.cancel(id);
        Ok(task)
    }

    /// Re-arms when the fire time is still ahead.
    pub fn restore_task(&mut self, id: TaskId) -> Result<Task> {
        let task = self.set_completed(id, false)?;
        self.scheduler.arm(&task);
        Ok(task)
    }

    fn set_completed(&mut self, id: TaskId, completed: bool) -> Result<Task> {
        let span = store_span!("set_completed", id.0);
        let _guard = span.enter();
        let task = self
            .store
            .set_completed(id, completed)?
            .ok_or_else(|| PoqtError::task_not_found(id.0))?;
        tracing::info!(task.id = %id, completed, "task completion changed");
        Ok(task)
    }

    /// Delete the task with its memberships and reminder.
    pub fn delete_task(&mut self, id: TaskId) -> Result<()> {
        {
            let span = store_span!("delete_task", id.0);
            let _guard = span.enter();
            if !self.store.delete_task(id)? {
                return Err(PoqtError::task_not_found(id.0));
            }
        }
        tracing::info!(task.id = %id, "task deleted");
        self.scheduler.forget(id);
        Ok(())
    }

    // ---- membership ----

    /// No-op (`Ok(false)`) when the task is already a member.
    pub fn add_to_list(&mut self, task: TaskId, list: ListKey) -> Result<bool> {
        let list = self.custom_target(list, "add tasks to")?;
        self.get_task(task)?;
        let added = self.store.add_membership(list, task)?;
        if added {
            tracing::info!(task.id = %task, list.id = %list, "task added to list");
        }
        Ok(added)
    }

    /// No-op (`Ok(false)`) when the task is not a member.
    pub fn remove_from_list(&mut self, task: TaskId, list: ListKey) -> Result<bool> {
        let list = self.custom_target(list, "remove tasks from")?;
        self.get_task(task)?;
        let removed = self.store.remove_membership(list, task)?;
        if removed {
            tracing::info!(task.id = %task, list.id = %list, "task removed from list");
        }
        Ok(removed)
    }

    pub fn remove_from_selected(&mut self, task: TaskId) -> Result<bool> {
        self.remove_from_list(task, self.selected)
    }

    /// Custom lists the task belongs to.
    pub fn lists_for_task(&self, task: TaskId) -> Result<Vec<TaskList>> {
        self.get_task(task)?;
        self.store.lists_for_task(task)
    }

    /// The id of an existing custom list, or the error for `key`.
    fn custom_target(&self, key: ListKey, action: &str) -> Result<ListId> {
        let id = key.custom_id().ok_or_else(|| {
            PoqtError::InvalidOperation(format!("cannot {} the {} list", action, virtual_title(key)))
        })?;
        if self.store.get_list(id)?.is_none() {
            return Err(PoqtError::list_not_found(id.0));
        }
        Ok(id)
    }

    // ---- custom lists ----

    pub fn create_list(&mut self, name: &str, render_kind: RenderKind) -> Result<TaskList> {
        let name = self.checked_name(name, None)?;
        let list = {
            let span = store_span!("create_list", 0);
            let _guard = span.enter();
            self.store.insert_list(&name, render_kind)?
        };
        tracing::info!(list.id = %list.id, name = %list.name, "list created");
        Ok(list)
    }

    pub fn edit_list(
        &mut self,
        key: ListKey,
        name: &str,
        render_kind: RenderKind,
    ) -> Result<TaskList> {
        let id = key.custom_id().ok_or_else(|| {
            PoqtError::InvalidOperation(format!("cannot edit the {} list", virtual_title(key)))
        })?;
        let name = self.checked_name(name, Some(id))?;
        let span = store_span!("edit_list", id.0);
        let _guard = span.enter();
        let list = self
            .store
            .update_list(id, &name, render_kind)?
            .ok_or_else(|| PoqtError::list_not_found(id.0))?;
        tracing::info!(list.id = %id, "list edited");
        Ok(list)
    }

    /// Delete a custom list, never its tasks. When it was selected the
    /// selection moves to the previous list in the cycle.
    pub fn delete_list(&mut self, key: ListKey) -> Result<()> {
        let id = key.custom_id().ok_or_else(|| {
            PoqtError::InvalidOperation(format!("cannot delete the {} list", virtual_title(key)))
        })?;
        let previous = if self.selected == key {
            let views = self.lists()?;
            views
                .iter()
                .position(|v| v.key == key)
                .map(|i| views[(i + views.len() - 1) % views.len()].key)
        } else {
            None
        };
        {
            let span = store_span!("delete_list", id.0);
            let _guard = span.enter();
            if !self.store.delete_list(id)? {
                return Err(PoqtError::list_not_found(id.0));
            }
        }
        if let Some(previous) = previous {
            self.selected = previous;
        }
        tracing::info!(list.id = %id, "list deleted");
        Ok(())
    }

    /// Trimmed, non-empty and unique among custom lists ignoring case.
    fn checked_name(&self, name: &str, editing: Option<ListId>) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PoqtError::Validation(
                "list name must not be empty".to_string(),
            ));
        }
        let folded = name.to_lowercase();
        let taken = self
            .store
            .lists()?
            .into_iter()
            .any(|l| Some(l.id) != editing && l.name.to_lowercase() == folded);
        if taken {
            return Err(PoqtError::Validation(format!(
                "a list named '{}' already exists",
                name
            )));
        }
        Ok(name.to_string())
    }
}

fn virtual_title(key: ListKey) -> &'static str {
    match key {
        ListKey::Completed => poqt_constant::app::COMPLETED_LIST_TITLE,
        _ => poqt_constant::app::ACTIVE_LIST_TITLE,
    }
}

fn not_found(key: ListKey) -> PoqtError {
    PoqtError::list_not_found(key.custom_id().map(|id| id.0).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{AlarmHandle, AlarmService, ReminderPayload, ReminderState};
    use chrono::{Duration, TimeZone};
    use poqt_core::db::SqliteStore;
    use poqt_core::{ManualClock, UrgencyBand};

    struct NoopAlarms;

    impl AlarmService for NoopAlarms {
        fn register(
            &self,
            task_id: TaskId,
            fire_at: DateTime<Utc>,
            _payload: ReminderPayload,
        ) -> Result<AlarmHandle> {
            Ok(AlarmHandle {
                task_id,
                fire_at,
                generation: 0,
            })
        }

        fn cancel(&self, _task_id: TaskId) -> bool {
            false
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 5, 14, 0, 0).unwrap()
    }

    fn manager() -> ListManager {
        let store: Arc<dyn TaskStore> = Arc::new(SqliteStore::in_memory().unwrap());
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(now()));
        let scheduler = Arc::new(ReminderScheduler::new(
            store.clone(),
            Arc::new(NoopAlarms),
            clock.clone(),
        ));
        ListManager::new(store, scheduler, ManagerContext::new(UrgencyConfig::default(), clock))
    }

    fn ids(tasks: &[RankedTask]) -> Vec<TaskId> {
        tasks.iter().map(|r| r.task.id).collect()
    }

    #[test]
    fn cycle_wraps_both_ways() {
        let mut m = manager();
        let work = m.create_list("Work", RenderKind::Colored).unwrap();
        assert_eq!(m.cycle_next().unwrap().key, ListKey::Completed);
        assert_eq!(m.cycle_next().unwrap().key, ListKey::Custom(work.id));
        assert_eq!(m.cycle_next().unwrap().key, ListKey::Active);
        assert_eq!(m.cycle_previous().unwrap().key, ListKey::Custom(work.id));
    }

    #[test]
    fn next_then_previous_is_identity() {
        let mut m = manager();
        m.create_list("a", RenderKind::Colored).unwrap();
        m.create_list("b", RenderKind::Plain).unwrap();
        for key in m.lists().unwrap().into_iter().map(|v| v.key) {
            m.select(key).unwrap();
            m.cycle_next().unwrap();
            m.cycle_previous().unwrap();
            assert_eq!(m.selected_key(), key);
        }
    }

    #[test]
    fn create_rejects_blank_description() {
        let mut m = manager();
        let err = m.create_task(TaskDraft::new("  ")).unwrap_err();
        assert!(matches!(err, PoqtError::Validation(_)));
        assert!(m.selected_tasks().unwrap().is_empty());
    }

    #[test]
    fn create_trims_and_arms() {
        let mut m = manager();
        let task = m
            .create_task(
                TaskDraft::new("  pay rent ")
                    .with_due(now() + Duration::days(1))
                    .with_reminder(ReminderLead::OneHour),
            )
            .unwrap();
        assert_eq!(task.description, "pay rent");
        assert!(matches!(
            m.scheduler().state(task.id),
            ReminderState::Armed { .. }
        ));
    }

    #[test]
    fn complete_moves_between_implicit_views_and_keeps_membership() {
        let mut m = manager();
        let list = m.create_list("home", RenderKind::Colored).unwrap();
        let task = m.create_task(TaskDraft::new("fix tap")).unwrap();
        m.add_to_list(task.id, ListKey::Custom(list.id)).unwrap();

        m.complete_task(task.id).unwrap();
        m.complete_task(task.id).unwrap();
        assert!(m.tasks_of(ListKey::Active).unwrap().is_empty());
        assert_eq!(ids(&m.tasks_of(ListKey::Completed).unwrap()), vec![task.id]);
        let custom = m.tasks_of(ListKey::Custom(list.id)).unwrap();
        assert_eq!(ids(&custom), vec![task.id]);
        assert!(custom[0].task.completed);
        assert_eq!(m.lists_for_task(task.id).unwrap(), vec![list.clone()]);

        m.restore_task(task.id).unwrap();
        let custom = m.tasks_of(ListKey::Custom(list.id)).unwrap();
        assert_eq!(ids(&custom), vec![task.id]);
        assert!(!custom[0].task.completed);
    }

    #[test]
    fn membership_on_virtual_lists_is_invalid() {
        let mut m = manager();
        let task = m.create_task(TaskDraft::new("x")).unwrap();
        for key in [ListKey::Active, ListKey::Completed] {
            assert!(matches!(
                m.add_to_list(task.id, key),
                Err(PoqtError::InvalidOperation(_))
            ));
            assert!(matches!(
                m.remove_from_list(task.id, key),
                Err(PoqtError::InvalidOperation(_))
            ));
        }
    }

    #[test]
    fn membership_with_unknown_ids_is_not_found() {
        let mut m = manager();
        let list = m.create_list("l", RenderKind::Colored).unwrap();
        let task = m.create_task(TaskDraft::new("t")).unwrap();
        assert!(matches!(
            m.add_to_list(TaskId(99), ListKey::Custom(list.id)),
            Err(PoqtError::NotFound { .. })
        ));
        assert!(matches!(
            m.add_to_list(task.id, ListKey::Custom(ListId(99))),
            Err(PoqtError::NotFound { .. })
        ));
        assert!(m.add_to_list(task.id, ListKey::Custom(list.id)).unwrap());
        assert!(!m.add_to_list(task.id, ListKey::Custom(list.id)).unwrap());
        assert!(m.remove_from_list(task.id, ListKey::Custom(list.id)).unwrap());
        assert!(!m.remove_from_list(task.id, ListKey::Custom(list.id)).unwrap());
    }

    #[test]
    fn list_names_are_unique_ignoring_case() {
        let mut m = manager();
        m.create_list(" Work ", RenderKind::Colored).unwrap();
        assert!(matches!(
            m.create_list("work", RenderKind::Plain),
            Err(PoqtError::Validation(_))
        ));
        assert!(matches!(
            m.create_list("   ", RenderKind::Plain),
            Err(PoqtError::Validation(_))
        ));
        let home = m.create_list("Home", RenderKind::Plain).unwrap();
        assert!(matches!(
            m.edit_list(ListKey::Custom(home.id), "WORK", RenderKind::Plain),
            Err(PoqtError::Validation(_))
        ));
        // renaming to its own name in another case is allowed
        let home = m
            .edit_list(ListKey::Custom(home.id), "HOME", RenderKind::Colored)
            .unwrap();
        assert_eq!(home.name, "HOME");
    }

    #[test]
    fn virtual_lists_cannot_be_edited_or_deleted() {
        let mut m = manager();
        assert!(matches!(
            m.edit_list(ListKey::Active, "x", RenderKind::Plain),
            Err(PoqtError::InvalidOperation(_))
        ));
        assert!(matches!(
            m.delete_list(ListKey::Completed),
            Err(PoqtError::InvalidOperation(_))
        ));
    }

    #[test]
    fn deleting_selected_list_selects_previous_and_keeps_tasks() {
        let mut m = manager();
        let a = m.create_list("a", RenderKind::Colored).unwrap();
        let b = m.create_list("b", RenderKind::Colored).unwrap();
        m.select(ListKey::Custom(b.id)).unwrap();
        let task = m.create_task_in_selected(TaskDraft::new("in b")).unwrap();

        m.delete_list(ListKey::Custom(b.id)).unwrap();
        assert_eq!(m.selected_key(), ListKey::Custom(a.id));
        assert!(m.get_task(task.id).is_ok());
        assert!(m.lists_for_task(task.id).unwrap().is_empty());
    }

    #[test]
    fn create_in_selected_respects_category() {
        let mut m = manager();
        let list = m.create_list("errands", RenderKind::Colored).unwrap();
        m.select(ListKey::Completed).unwrap();
        assert!(matches!(
            m.create_task_in_selected(TaskDraft::new("nope")),
            Err(PoqtError::InvalidOperation(_))
        ));

        m.select(ListKey::Custom(list.id)).unwrap();
        let task = m.create_task_in_selected(TaskDraft::new("stamps")).unwrap();
        assert_eq!(ids(&m.selected_tasks().unwrap()), vec![task.id]);
        assert!(m.remove_from_selected(task.id).unwrap());
        assert!(m.selected_tasks().unwrap().is_empty());
        assert_eq!(ids(&m.tasks_of(ListKey::Active).unwrap()), vec![task.id]);
    }

    #[test]
    fn select_unknown_list_falls_back_to_active() {
        let mut m = manager();
        let view = m.select(ListKey::Custom(ListId(42))).unwrap();
        assert_eq!(view.key, ListKey::Active);
        assert_eq!(m.selected_title().unwrap(), "Active");
        assert_eq!(m.selected_category().unwrap(), ListCategory::Active);
    }

    #[test]
    fn edit_preserves_completion_and_does_not_arm() {
        let mut m = manager();
        let task = m.create_task(TaskDraft::new("old")).unwrap();
        m.complete_task(task.id).unwrap();
        let edited = m
            .edit_task(
                task.id,
                TaskDraft::new("new")
                    .with_due(now() + Duration::days(1))
                    .with_reminder(ReminderLead::OneHour),
            )
            .unwrap();
        assert!(edited.completed);
        assert_eq!(m.scheduler().state(task.id), ReminderState::Unscheduled);
        assert!(matches!(
            m.edit_task(TaskId(404), TaskDraft::new("x")),
            Err(PoqtError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_unknown_task_is_not_found() {
        let mut m = manager();
        assert!(matches!(
            m.delete_task(TaskId(1)),
            Err(PoqtError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_drops_reminder_state() {
        let mut m = manager();
        let task = m
            .create_task(
                TaskDraft::new("return library books")
                    .with_due(now() + Duration::days(2))
                    .with_reminder(ReminderLead::OneDay),
            )
            .unwrap();
        assert!(matches!(
            m.scheduler().state(task.id),
            ReminderState::Armed { .. }
        ));
        m.delete_task(task.id).unwrap();
        assert_eq!(m.scheduler().state(task.id), ReminderState::Unscheduled);
    }

    #[test]
    fn selected_tasks_are_ranked() {
        let mut m = manager();
        let later = m
            .create_task(TaskDraft::new("later").with_due(now() + Duration::hours(20)))
            .unwrap();
        let undated = m.create_task(TaskDraft::new("whenever")).unwrap();
        let urgent = m
            .create_task(
                TaskDraft::new("urgent")
                    .with_due(now() + Duration::minutes(30))
                    .with_priority(Priority::High),
            )
            .unwrap();
        let ranked = m.selected_tasks().unwrap();
        assert_eq!(ids(&ranked), vec![urgent.id, later.id, undated.id]);
        assert_eq!(ranked[0].urgency.band, UrgencyBand::High);
    }

    #[test]
    fn draft_uses_context_defaults() {
        let store: Arc<dyn TaskStore> = Arc::new(SqliteStore::in_memory().unwrap());
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(now()));
        let scheduler = Arc::new(ReminderScheduler::new(
            store.clone(),
            Arc::new(NoopAlarms),
            clock.clone(),
        ));
        let context = ManagerContext::new(UrgencyConfig::default(), clock)
            .with_defaults(Priority::High, ReminderLead::FifteenMinutes);
        let m = ListManager::new(store, scheduler, context);
        let draft = m.draft("x");
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(draft.reminder, ReminderLead::FifteenMinutes);
    }
}
