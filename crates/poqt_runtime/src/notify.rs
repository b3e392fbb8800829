//! Notification delivery seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use poqt_core::{Result, Task, TaskId};

/// What the user sees when a reminder fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub task_id: TaskId,
    /// Task description
    pub title: String,
    /// "Due in <lead>" or "Due now"
    pub body: String,
    pub due: Option<DateTime<Utc>>,
    pub fire_at: DateTime<Utc>,
}

impl Notification {
    pub fn for_task(task: &Task, fire_at: DateTime<Utc>) -> Self {
        Self {
            task_id: task.id,
            title: task.description.clone(),
            body: task.reminder.notification_text(),
            due: task.due,
            fire_at,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Emits each notification as a tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            task.id = %notification.task_id,
            title = %notification.title,
            body = %notification.body,
            "reminder"
        );
        Ok(())
    }
}
