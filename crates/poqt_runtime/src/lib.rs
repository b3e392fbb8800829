//! poqt runtime: list management, reminder scheduling and wiring.

pub mod config;
pub mod list_manager;
pub mod list_view;
pub mod notify;
pub mod runtime;
pub mod scheduler;

pub use config::PoqtConfig;
pub use list_manager::{ListManager, ManagerContext};
pub use list_view::{ListCategory, ListKey, ListView, TaskAction, ViewSource};
pub use notify::{LogNotifier, Notification, Notifier};
pub use runtime::Runtime;
pub use scheduler::{
    compute_fire_time, reminder_channel, AlarmHandle, AlarmService, ArmOutcome,
    DispatchOutcome, ReloadSummary, ReminderDispatcher, ReminderFired, ReminderPayload,
    ReminderScheduler, ReminderState, TokioAlarmService,
};
