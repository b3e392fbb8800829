//! Reminder scheduling: computes fire times, keeps one alarm per task and
//! rebuilds every pending alarm from storage after a restart.
//!
//! Per-task state moves `Unscheduled -> Armed -> Fired` or
//! `Armed -> Cancelled`; arming again starts a fresh cycle.

pub mod alarm;
pub mod dispatcher;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use poqt_core::task::fire_time;
use poqt_core::{Clock, ReminderLead, Result, Task, TaskId, TaskStore};
use poqt_observability::{record_error, reminder_span};

pub use alarm::{
    reminder_channel, AlarmHandle, AlarmService, ReminderFired, ReminderPayload, ReminderRx,
    ReminderTx, TokioAlarmService,
};
pub use dispatcher::{DispatchOutcome, ReminderDispatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReminderState {
    Unscheduled,
    Armed { fire_at: DateTime<Utc> },
    Fired { fire_at: DateTime<Utc> },
    Cancelled,
}

/// Result of [`ReminderScheduler::arm`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArmOutcome {
    Armed { fire_at: DateTime<Utc> },
    /// No due date, reminders off, or task completed.
    Disabled,
    /// Fire time is not in the future.
    Elapsed { fire_at: DateTime<Utc> },
    /// The alarm service refused the registration.
    Failed(String),
}

impl ArmOutcome {
    pub fn is_armed(&self) -> bool {
        matches!(self, ArmOutcome::Armed { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReloadSummary {
    pub considered: usize,
    pub armed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// `due - lead`; `None` when reminders are off.
pub fn compute_fire_time(due: DateTime<Utc>, reminder: ReminderLead) -> Option<DateTime<Utc>> {
    fire_time(due, reminder)
}

pub struct ReminderScheduler {
    store: Arc<dyn TaskStore>,
    alarms: Arc<dyn AlarmService>,
    clock: Arc<dyn Clock>,
    states: Mutex<HashMap<TaskId, ReminderState>>,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn TaskStore>,
        alarms: Arc<dyn AlarmService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            alarms,
            clock,
            states: Mutex::new(HashMap::new()),
        }
    }

    fn states(&self) -> MutexGuard<'_, HashMap<TaskId, ReminderState>> {
        self.states.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn state(&self, task_id: TaskId) -> ReminderState {
        self.states()
            .get(&task_id)
            .copied()
            .unwrap_or(ReminderState::Unscheduled)
    }

    /// Bring the alarm for `task` in line with its current fields.
    ///
    /// Any previous registration is cancelled first. Registration failures
    /// are logged and leave the task unscheduled.
    pub fn arm(&self, task: &Task) -> ArmOutcome {
        let span = reminder_span!("arm", task.id.0);
        let _guard = span.enter();

        let fire_at = match task.fire_time() {
            Some(fire_at) if !task.completed => fire_at,
            _ => {
                self.disarm(task.id);
                tracing::debug!(task.id = %task.id, "reminder disabled");
                return ArmOutcome::Disabled;
            }
        };

        if fire_at <= self.now() {
            self.disarm(task.id);
            tracing::debug!(task.id = %task.id, %fire_at, "fire time already passed, not arming");
            return ArmOutcome::Elapsed { fire_at };
        }

        self.alarms.cancel(task.id);
        let payload = ReminderPayload {
            task_id: task.id,
            description: task.description.clone(),
            label: task.reminder.label().to_string(),
            fire_at,
        };
        match self.alarms.register(task.id, fire_at, payload) {
            Ok(_) => {
                self.states()
                    .insert(task.id, ReminderState::Armed { fire_at });
                tracing::info!(task.id = %task.id, %fire_at, "reminder armed");
                ArmOutcome::Armed { fire_at }
            }
            Err(e) => {
                self.states().remove(&task.id);
                record_error(&e);
                tracing::warn!(task.id = %task.id, %fire_at, "reminder left unscheduled");
                ArmOutcome::Failed(e.to_string())
            }
        }
    }

    /// Drop any alarm for the task. Safe when nothing is armed.
    pub fn cancel(&self, task_id: TaskId) {
        let span = reminder_span!("cancel", task_id.0);
        let _guard = span.enter();
        if self.disarm(task_id) {
            tracing::info!(task.id = %task_id, "reminder cancelled");
        } else {
            tracing::debug!(task.id = %task_id, "no reminder to cancel");
        }
    }

    /// Cancel any alarm and drop all state kept for a task that no longer
    /// exists.
    pub fn forget(&self, task_id: TaskId) {
        self.alarms.cancel(task_id);
        if self.states().remove(&task_id).is_some() {
            tracing::debug!(task.id = %task_id, "reminder state dropped");
        }
    }

    /// Returns whether the task was armed.
    fn disarm(&self, task_id: TaskId) -> bool {
        self.alarms.cancel(task_id);
        let mut states = self.states();
        match states.get(&task_id) {
            Some(ReminderState::Armed { .. }) => {
                states.insert(task_id, ReminderState::Cancelled);
                true
            }
            _ => false,
        }
    }

    /// Re-arm every incomplete task with a due date and a reminder. Called
    /// once at startup; storage is the only source of truth.
    pub fn reload_all(&self) -> Result<ReloadSummary> {
        let span = tracing::info_span!("reminder.reload_all");
        let _guard = span.enter();

        let mut summary = ReloadSummary::default();
        for task in self.store.pending_reminders()? {
            summary.considered += 1;
            match self.arm(&task) {
                ArmOutcome::Armed { .. } => summary.armed += 1,
                ArmOutcome::Disabled | ArmOutcome::Elapsed { .. } => summary.skipped += 1,
                ArmOutcome::Failed(_) => summary.failed += 1,
            }
        }
        tracing::info!(
            considered = summary.considered,
            armed = summary.armed,
            skipped = summary.skipped,
            failed = summary.failed,
            "reminders reloaded"
        );
        Ok(summary)
    }

    /// Record delivery of the alarm that fired at `fire_at`.
    pub fn mark_fired(&self, task_id: TaskId, fire_at: DateTime<Utc>) {
        self.states()
            .insert(task_id, ReminderState::Fired { fire_at });
    }
}
