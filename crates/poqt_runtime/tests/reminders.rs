//! Fired reminders: dispatcher re-validation and end-to-end delivery.

mod common;

use std::sync::Arc;

use chrono::Duration;
use common::{start, CapturingNotifier, Harness};
use poqt_core::db::SqliteStore;
use poqt_core::{Clock, ManualClock, ReminderLead, TaskDraft};
use poqt_runtime::{
    DispatchOutcome, ReminderDispatcher, ReminderFired, ReminderPayload, ReminderState, Runtime,
};

fn dispatcher(h: &Harness, notifier: Arc<CapturingNotifier>) -> ReminderDispatcher {
    ReminderDispatcher::new(
        h.store.clone(),
        h.scheduler.clone(),
        notifier,
        h.clock.clone(),
    )
}

fn fired_for(h: &Harness, index: usize) -> ReminderFired {
    ReminderFired {
        payload: h.alarms.live()[index].clone(),
    }
}

#[tokio::test]
async fn delivers_when_due() {
    let mut h = Harness::new();
    let due = start() + Duration::hours(1);
    let task = h
        .manager
        .create_task(
            TaskDraft::new("stand-up")
                .with_due(due)
                .with_reminder(ReminderLead::FifteenMinutes),
        )
        .unwrap();
    let fired = fired_for(&h, 0);
    let notifier = Arc::new(CapturingNotifier::default());
    let d = dispatcher(&h, notifier.clone());

    h.clock.set(fired.payload.fire_at);
    let outcome = d.handle(fired.clone()).await;
    assert!(matches!(outcome, DispatchOutcome::Delivered(_)));

    let seen = notifier.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].task_id, task.id);
    assert_eq!(seen[0].title, "stand-up");
    assert_eq!(seen[0].body, "Due in 15 minutes");
    assert_eq!(seen[0].due, Some(due));
    assert_eq!(
        h.scheduler.state(task.id),
        ReminderState::Fired {
            fire_at: due - Duration::minutes(15)
        }
    );

    // a duplicate of the same fire is dropped
    assert_eq!(d.handle(fired).await, DispatchOutcome::Stale);
    assert_eq!(notifier.seen().len(), 1);
}

#[tokio::test]
async fn deleted_and_completed_tasks_are_silent() {
    let mut h = Harness::new();
    let draft = |name: &str| {
        TaskDraft::new(name)
            .with_due(start() + Duration::hours(2))
            .with_reminder(ReminderLead::OneHour)
    };
    let gone = h.manager.create_task(draft("gone")).unwrap();
    let fired_gone = fired_for(&h, 0);
    let done = h.manager.create_task(draft("done")).unwrap();
    let fired_done = fired_for(&h, 1);

    h.manager.delete_task(gone.id).unwrap();
    h.manager.complete_task(done.id).unwrap();
    h.clock.advance(Duration::hours(1));

    let notifier = Arc::new(CapturingNotifier::default());
    let d = dispatcher(&h, notifier.clone());
    assert_eq!(d.handle(fired_gone).await, DispatchOutcome::Missing);
    assert_eq!(d.handle(fired_done).await, DispatchOutcome::Completed);
    assert!(notifier.seen().is_empty());
    assert_eq!(h.scheduler.state(gone.id), ReminderState::Unscheduled);
}

#[tokio::test]
async fn fire_for_old_due_date_is_stale() {
    let mut h = Harness::new();
    let task = h
        .manager
        .create_task(
            TaskDraft::new("flight")
                .with_due(start() + Duration::hours(4))
                .with_reminder(ReminderLead::TwoHours),
        )
        .unwrap();
    let old = fired_for(&h, 0);
    h.manager
        .edit_task(
            task.id,
            TaskDraft::new("flight")
                .with_due(start() + Duration::hours(8))
                .with_reminder(ReminderLead::TwoHours),
        )
        .unwrap();
    h.clock.set(old.payload.fire_at);

    let notifier = Arc::new(CapturingNotifier::default());
    assert_eq!(
        dispatcher(&h, notifier.clone()).handle(old).await,
        DispatchOutcome::Stale
    );
    assert!(notifier.seen().is_empty());
}

#[tokio::test]
async fn early_fire_is_rearmed() {
    let mut h = Harness::new();
    let task = h
        .manager
        .create_task(
            TaskDraft::new("oven")
                .with_due(start() + Duration::minutes(50))
                .with_reminder(ReminderLead::AtDueTime),
        )
        .unwrap();
    let fired = fired_for(&h, 0);
    let registrations = h.alarms.registrations();

    let notifier = Arc::new(CapturingNotifier::default());
    let outcome = dispatcher(&h, notifier.clone()).handle(fired).await;
    assert!(matches!(outcome, DispatchOutcome::Rearmed(ref o) if o.is_armed()));
    assert_eq!(h.alarms.registrations(), registrations + 1);
    assert!(notifier.seen().is_empty());
    assert!(matches!(h.scheduler.state(task.id), ReminderState::Armed { .. }));
}

#[tokio::test]
async fn unknown_task_payload_is_missing() {
    let h = Harness::new();
    let notifier = Arc::new(CapturingNotifier::default());
    let fired = ReminderFired {
        payload: ReminderPayload {
            task_id: poqt_core::TaskId(999),
            description: "ghost".to_string(),
            label: "1 hour".to_string(),
            fire_at: start(),
        },
    };
    assert_eq!(
        dispatcher(&h, notifier).handle(fired).await,
        DispatchOutcome::Missing
    );
}

#[tokio::test(start_paused = true)]
async fn runtime_delivers_through_tokio_alarms() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(start()));
    let store = SqliteStore::open(dir.path()).unwrap();
    let mut runtime = Runtime::with_clock(store, dir.path(), clock.clone()).unwrap();
    let notifier = Arc::new(CapturingNotifier::default());
    runtime.spawn_dispatcher(notifier.clone()).unwrap();
    assert!(runtime.spawn_dispatcher(notifier.clone()).is_err());

    let task = runtime
        .manager_mut()
        .create_task(
            TaskDraft::new("take pills")
                .with_due(start() + Duration::minutes(10))
                .with_reminder(ReminderLead::FiveMinutes),
        )
        .unwrap();

    // tokio time drives the sleeper; the manual clock must agree on delivery
    clock.advance(Duration::minutes(5));
    tokio::time::sleep(std::time::Duration::from_secs(5 * 60 + 1)).await;
    tokio::task::yield_now().await;

    let seen = notifier.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].task_id, task.id);
    assert_eq!(seen[0].body, "Due in 5 minutes");
    assert!(matches!(
        runtime.scheduler().state(task.id),
        ReminderState::Fired { .. }
    ));
}

#[tokio::test]
async fn runtime_persists_selection_and_config() {
    let dir = tempfile::tempdir().unwrap();
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(start()));

    let list_id = {
        let store = SqliteStore::open(dir.path()).unwrap();
        let mut runtime = Runtime::with_clock(store, dir.path(), clock.clone()).unwrap();
        let list = runtime
            .manager_mut()
            .create_list("reading", poqt_core::RenderKind::Plain)
            .unwrap();
        runtime
            .manager_mut()
            .select(poqt_runtime::ListKey::Custom(list.id))
            .unwrap();
        runtime.save_selection().unwrap();
        runtime
            .set_config_value("urgency.time_window_minutes", "120")
            .unwrap();
        assert!(runtime.set_config_value("urgency.mid_threshold", "2").is_err());
        assert!(runtime.set_config_value("no.such.key", "1").is_err());
        list.id
    };

    let store = SqliteStore::open(dir.path()).unwrap();
    let runtime = Runtime::with_clock(store, dir.path(), clock).unwrap();
    assert_eq!(
        runtime.manager().selected_key(),
        poqt_runtime::ListKey::Custom(list_id)
    );
    assert_eq!(runtime.config().urgency.time_window_minutes, 120);
    assert_eq!(
        runtime
            .config_value("urgency.mid_threshold")
            .unwrap()
            .as_deref(),
        Some("0.4")
    );
}

#[tokio::test]
async fn reload_after_restart_rearms_pending() {
    let dir = tempfile::tempdir().unwrap();
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(start()));
    {
        let store = SqliteStore::open(dir.path()).unwrap();
        let mut runtime = Runtime::with_clock(store, dir.path(), clock.clone()).unwrap();
        runtime
            .manager_mut()
            .create_task(
                TaskDraft::new("pay invoice")
                    .with_due(start() + Duration::days(2))
                    .with_reminder(ReminderLead::OneDay),
            )
            .unwrap();
    }
    let store = SqliteStore::open(dir.path()).unwrap();
    let runtime = Runtime::with_clock(store, dir.path(), clock).unwrap();
    let summary = runtime.reload_all().unwrap();
    assert_eq!(summary.armed, 1);
}
