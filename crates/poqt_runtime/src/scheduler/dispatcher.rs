//! Consumer of the reminder channel.
//!
//! A fired alarm only carries what was true when it was registered, so every
//! message is checked against the stored task before anything is delivered.

use std::sync::Arc;

use poqt_core::{Clock, TaskStore};
use poqt_observability::{record_error, reminder_span};
use tracing::Instrument;

use super::alarm::{ReminderFired, ReminderRx};
use super::{ArmOutcome, ReminderScheduler, ReminderState};
use crate::notify::{Notification, Notifier};

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Delivered(Notification),
    /// Task was deleted after the alarm was registered.
    Missing,
    Completed,
    /// Due date or lead changed, or this fire was already delivered.
    Stale,
    /// The clock is still before the fire time; the alarm was registered again.
    Rearmed(ArmOutcome),
    /// Store read or notifier failed.
    Failed(String),
}

pub struct ReminderDispatcher {
    store: Arc<dyn TaskStore>,
    scheduler: Arc<ReminderScheduler>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl ReminderDispatcher {
    pub fn new(
        store: Arc<dyn TaskStore>,
        scheduler: Arc<ReminderScheduler>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            scheduler,
            notifier,
            clock,
        }
    }

    /// Handle messages until every sender is gone.
    pub async fn run(self, mut rx: ReminderRx) {
        tracing::debug!("reminder dispatcher started");
        while let Some(fired) = rx.recv().await {
            self.handle(fired).await;
        }
        tracing::debug!("reminder channel closed, dispatcher stopping");
    }

    pub async fn handle(&self, fired: ReminderFired) -> DispatchOutcome {
        let task_id = fired.payload.task_id;
        let span = reminder_span!("dispatch", task_id.0);
        self.dispatch(fired).instrument(span).await
    }

    async fn dispatch(&self, fired: ReminderFired) -> DispatchOutcome {
        let payload = fired.payload;
        let task_id = payload.task_id;

        let task = match self.store.get_task(task_id) {
            Ok(Some(task)) => task,
            Ok(None) => {
                tracing::debug!(task.id = %task_id, "reminder for deleted task ignored");
                self.scheduler.forget(task_id);
                return DispatchOutcome::Missing;
            }
            Err(e) => {
                record_error(&e);
                return DispatchOutcome::Failed(e.to_string());
            }
        };

        if task.completed {
            tracing::debug!(task.id = %task_id, "reminder for completed task ignored");
            return DispatchOutcome::Completed;
        }

        let fire_at = payload.fire_at;
        if task.fire_time() != Some(fire_at)
            || self.scheduler.state(task_id) == (ReminderState::Fired { fire_at })
        {
            tracing::warn!(task.id = %task_id, %fire_at, "stale reminder ignored");
            return DispatchOutcome::Stale;
        }

        if fire_at > self.clock.now() {
            tracing::info!(task.id = %task_id, %fire_at, "reminder fired early, re-arming");
            return DispatchOutcome::Rearmed(self.scheduler.arm(&task));
        }

        let notification = Notification::for_task(&task, fire_at);
        self.scheduler.mark_fired(task_id, fire_at);
        match self.notifier.notify(&notification).await {
            Ok(()) => {
                tracing::info!(task.id = %task_id, %fire_at, "reminder delivered");
                DispatchOutcome::Delivered(notification)
            }
            Err(e) => {
                record_error(&e);
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}
