//! Task and list entities.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::ordinal::Ordinal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(pub i64);

impl std::fmt::Display for ListId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }
}

impl Ordinal for Priority {
    const COLUMN: &'static str = "priority_ordinal";

    fn to_ordinal(self) -> i64 {
        match self {
            Priority::Low => 0,
            Priority::Normal => 1,
            Priority::High => 2,
        }
    }

    fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            0 => Some(Priority::Low),
            1 => Some(Priority::Normal),
            2 => Some(Priority::High),
            _ => None,
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Ok(Priority::Low),
            "normal" | "n" | "medium" => Ok(Priority::Normal),
            "high" | "h" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How long before the due date a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderLead {
    #[default]
    None,
    AtDueTime,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    OneDay,
    OneWeek,
}

impl ReminderLead {
    pub const ALL: [ReminderLead; 9] = [
        ReminderLead::None,
        ReminderLead::AtDueTime,
        ReminderLead::FiveMinutes,
        ReminderLead::FifteenMinutes,
        ReminderLead::ThirtyMinutes,
        ReminderLead::OneHour,
        ReminderLead::TwoHours,
        ReminderLead::OneDay,
        ReminderLead::OneWeek,
    ];

    /// Offset before the due date; `None` when reminders are disabled.
    pub fn lead(&self) -> Option<Duration> {
        match self {
            ReminderLead::None => None,
            ReminderLead::AtDueTime => Some(Duration::zero()),
            ReminderLead::FiveMinutes => Some(Duration::minutes(5)),
            ReminderLead::FifteenMinutes => Some(Duration::minutes(15)),
            ReminderLead::ThirtyMinutes => Some(Duration::minutes(30)),
            ReminderLead::OneHour => Some(Duration::hours(1)),
            ReminderLead::TwoHours => Some(Duration::hours(2)),
            ReminderLead::OneDay => Some(Duration::days(1)),
            ReminderLead::OneWeek => Some(Duration::weeks(1)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, ReminderLead::None)
    }

    /// Human-readable lead time, e.g. "15 minutes".
    pub fn label(&self) -> &'static str {
        match self {
            ReminderLead::None => "no reminder",
            ReminderLead::AtDueTime => "at due time",
            ReminderLead::FiveMinutes => "5 minutes",
            ReminderLead::FifteenMinutes => "15 minutes",
            ReminderLead::ThirtyMinutes => "30 minutes",
            ReminderLead::OneHour => "1 hour",
            ReminderLead::TwoHours => "2 hours",
            ReminderLead::OneDay => "1 day",
            ReminderLead::OneWeek => "1 week",
        }
    }

    /// Notification body for a reminder with this lead.
    pub fn notification_text(&self) -> String {
        match self {
            ReminderLead::None | ReminderLead::AtDueTime => "Due now".to_string(),
            other => format!("Due in {}", other.label()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderLead::None => "none",
            ReminderLead::AtDueTime => "due",
            ReminderLead::FiveMinutes => "5m",
            ReminderLead::FifteenMinutes => "15m",
            ReminderLead::ThirtyMinutes => "30m",
            ReminderLead::OneHour => "1h",
            ReminderLead::TwoHours => "2h",
            ReminderLead::OneDay => "1d",
            ReminderLead::OneWeek => "1w",
        }
    }
}

impl Ordinal for ReminderLead {
    const COLUMN: &'static str = "reminder_ordinal";

    fn to_ordinal(self) -> i64 {
        match self {
            ReminderLead::None => 0,
            ReminderLead::AtDueTime => 1,
            ReminderLead::FiveMinutes => 2,
            ReminderLead::FifteenMinutes => 3,
            ReminderLead::ThirtyMinutes => 4,
            ReminderLead::OneHour => 5,
            ReminderLead::TwoHours => 6,
            ReminderLead::OneDay => 7,
            ReminderLead::OneWeek => 8,
        }
    }

    fn from_ordinal(ordinal: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|lead| lead.to_ordinal() == ordinal)
    }
}

impl FromStr for ReminderLead {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lead| lead.as_str() == s)
            .or(match s.as_str() {
                "off" => Some(ReminderLead::None),
                "at_due_time" | "now" => Some(ReminderLead::AtDueTime),
                _ => None,
            })
            .ok_or_else(|| {
                format!(
                    "unknown reminder '{}' (expected one of: {})",
                    s,
                    Self::ALL.map(|l| l.as_str()).join(", ")
                )
            })
    }
}

impl std::fmt::Display for ReminderLead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Presentation style of a custom list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderKind {
    #[default]
    Colored,
    Plain,
}

impl RenderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderKind::Colored => "colored",
            RenderKind::Plain => "plain",
        }
    }
}

impl Ordinal for RenderKind {
    const COLUMN: &'static str = "render_kind_ordinal";

    fn to_ordinal(self) -> i64 {
        match self {
            RenderKind::Colored => 0,
            RenderKind::Plain => 1,
        }
    }

    fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            0 => Some(RenderKind::Colored),
            1 => Some(RenderKind::Plain),
            _ => None,
        }
    }
}

impl FromStr for RenderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "colored" | "coloured" | "color" => Ok(RenderKind::Colored),
            "plain" => Ok(RenderKind::Plain),
            other => Err(format!("unknown render kind '{}'", other)),
        }
    }
}

impl std::fmt::Display for RenderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Editable fields of a task. Used for both creation and full edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub description: String,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub reminder: ReminderLead,
}

impl TaskDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            due: None,
            priority: Priority::default(),
            reminder: ReminderLead::default(),
        }
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(due);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_reminder(mut self, reminder: ReminderLead) -> Self {
        self.reminder = reminder;
        self
    }

    /// Trims the description and rejects it when empty.
    pub fn validated(mut self) -> crate::Result<Self> {
        let trimmed = self.description.trim();
        if trimmed.is_empty() {
            return Err(crate::PoqtError::Validation(
                "task description must not be empty".to_string(),
            ));
        }
        if trimmed.len() != self.description.len() {
            self.description = trimmed.to_string();
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub due: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub reminder: ReminderLead,
    pub completed: bool,
}

impl Task {
    /// Instant the reminder should fire, ignoring whether it is in the past.
    /// `None` when there is no due date or reminders are disabled.
    pub fn fire_time(&self) -> Option<DateTime<Utc>> {
        fire_time(self.due?, self.reminder)
    }

    /// Replace every editable field; `id` and `completed` are untouched.
    pub fn apply(&mut self, draft: TaskDraft) {
        self.description = draft.description;
        self.due = draft.due;
        self.priority = draft.priority;
        self.reminder = draft.reminder;
    }
}

/// `due - lead`, or `due` itself for at-due-time reminders.
pub fn fire_time(due: DateTime<Utc>, reminder: ReminderLead) -> Option<DateTime<Utc>> {
    reminder.lead().map(|lead| due - lead)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: ListId,
    pub name: String,
    pub render_kind: RenderKind,
}
