//! Timer seam: single-shot alarms keyed by task id.
//!
//! A fired alarm is a `ReminderFired` message on the reminder channel; the
//! `ReminderDispatcher` consumes it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use poqt_core::{Clock, PoqtError, Result, TaskId};

/// Carried by a registration and handed back when it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub task_id: TaskId,
    pub description: String,
    /// Lead time label, e.g. "15 minutes"
    pub label: String,
    pub fire_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderFired {
    pub payload: ReminderPayload,
}

pub type ReminderTx = mpsc::UnboundedSender<ReminderFired>;
pub type ReminderRx = mpsc::UnboundedReceiver<ReminderFired>;

pub fn reminder_channel() -> (ReminderTx, ReminderRx) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmHandle {
    pub task_id: TaskId,
    pub fire_at: DateTime<Utc>,
    pub generation: u64,
}

/// At most one registration per task; registering again replaces it.
/// Alarms never fire before `fire_at`.
pub trait AlarmService: Send + Sync {
    fn register(
        &self,
        task_id: TaskId,
        fire_at: DateTime<Utc>,
        payload: ReminderPayload,
    ) -> Result<AlarmHandle>;

    /// Safe to call when nothing is registered. Returns whether a
    /// registration was removed.
    fn cancel(&self, task_id: TaskId) -> bool;
}

struct Registration {
    generation: u64,
    sleeper: JoinHandle<()>,
}

type Registrations = Arc<Mutex<HashMap<TaskId, Registration>>>;

fn lock(registrations: &Registrations) -> MutexGuard<'_, HashMap<TaskId, Registration>> {
    registrations.lock().unwrap_or_else(|e| e.into_inner())
}

/// In-process alarms: one sleeping tokio task per registration.
pub struct TokioAlarmService {
    handle: Handle,
    tx: ReminderTx,
    clock: Arc<dyn Clock>,
    registrations: Registrations,
    next_generation: AtomicU64,
}

impl TokioAlarmService {
    /// Uses the current tokio runtime; fails outside one.
    pub fn new(tx: ReminderTx, clock: Arc<dyn Clock>) -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| PoqtError::Scheduling(format!("no tokio runtime: {}", e)))?;
        Ok(Self::with_handle(handle, tx, clock))
    }

    pub fn with_handle(handle: Handle, tx: ReminderTx, clock: Arc<dyn Clock>) -> Self {
        Self {
            handle,
            tx,
            clock,
            registrations: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Number of alarms waiting to fire.
    pub fn pending(&self) -> usize {
        lock(&self.registrations).len()
    }
}

impl AlarmService for TokioAlarmService {
    fn register(
        &self,
        task_id: TaskId,
        fire_at: DateTime<Utc>,
        payload: ReminderPayload,
    ) -> Result<AlarmHandle> {
        if self.tx.is_closed() {
            return Err(PoqtError::Scheduling(
                "reminder channel is closed".to_string(),
            ));
        }
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let delay = (fire_at - self.clock.now()).to_std().unwrap_or_default();

        let tx = self.tx.clone();
        let registrations = Arc::clone(&self.registrations);
        // Hold the lock across spawn so the sleeper cannot clear its entry
        // before it is inserted.
        let mut map = lock(&self.registrations);
        let sleeper = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut map = lock(&registrations);
                if map.get(&task_id).map(|r| r.generation) == Some(generation) {
                    map.remove(&task_id);
                }
            }
            if tx.send(ReminderFired { payload }).is_err() {
                tracing::warn!(task.id = %task_id, "reminder channel closed before delivery");
            }
        });
        if let Some(previous) = map.insert(task_id, Registration { generation, sleeper }) {
            previous.sleeper.abort();
        }

        Ok(AlarmHandle {
            task_id,
            fire_at,
            generation,
        })
    }

    fn cancel(&self, task_id: TaskId) -> bool {
        match lock(&self.registrations).remove(&task_id) {
            Some(registration) => {
                registration.sleeper.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for TokioAlarmService {
    fn drop(&mut self) {
        for (_, registration) in lock(&self.registrations).drain() {
            registration.sleeper.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use poqt_core::ManualClock;

    fn payload(task_id: TaskId, fire_at: DateTime<Utc>) -> ReminderPayload {
        ReminderPayload {
            task_id,
            description: "water plants".to_string(),
            label: "5 minutes".to_string(),
            fire_at,
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let (tx, mut rx) = reminder_channel();
        let alarms = TokioAlarmService::new(tx, Arc::new(ManualClock::new(start()))).unwrap();
        let fire_at = start() + Duration::minutes(10);
        alarms.register(TaskId(1), fire_at, payload(TaskId(1), fire_at)).unwrap();
        assert_eq!(alarms.pending(), 1);

        tokio::time::sleep(std::time::Duration::from_secs(9 * 60)).await;
        assert!(rx.try_recv().is_err());

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired.payload.task_id, TaskId(1));
        assert_eq!(alarms.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reregistering_replaces_previous_alarm() {
        let (tx, mut rx) = reminder_channel();
        let alarms = TokioAlarmService::new(tx, Arc::new(ManualClock::new(start()))).unwrap();
        let first = start() + Duration::minutes(1);
        let second = start() + Duration::minutes(3);
        alarms.register(TaskId(4), first, payload(TaskId(4), first)).unwrap();
        alarms.register(TaskId(4), second, payload(TaskId(4), second)).unwrap();
        assert_eq!(alarms.pending(), 1);

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired.payload.fire_at, second);
        tokio::time::sleep(std::time::Duration::from_secs(600)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_alarm_never_fires() {
        let (tx, mut rx) = reminder_channel();
        let alarms = TokioAlarmService::new(tx, Arc::new(ManualClock::new(start()))).unwrap();
        let fire_at = start() + Duration::seconds(30);
        alarms.register(TaskId(2), fire_at, payload(TaskId(2), fire_at)).unwrap();
        assert!(alarms.cancel(TaskId(2)));
        assert!(!alarms.cancel(TaskId(2)));

        tokio::time::sleep(std::time::Duration::from_secs(120)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_channel_rejects_registration() {
        let (tx, rx) = reminder_channel();
        drop(rx);
        let alarms = TokioAlarmService::new(tx, Arc::new(ManualClock::new(start()))).unwrap();
        let fire_at = start() + Duration::minutes(5);
        let err = alarms
            .register(TaskId(3), fire_at, payload(TaskId(3), fire_at))
            .unwrap_err();
        assert!(matches!(err, PoqtError::Scheduling(_)));
        assert_eq!(alarms.pending(), 0);
    }
}
