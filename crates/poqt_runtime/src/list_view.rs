//! Resolved lists: the two implicit views and one view per custom list.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use poqt_constant::app::{ACTIVE_LIST_TITLE, COMPLETED_LIST_TITLE};
use poqt_core::comparator;
use poqt_core::{
    classify, ListId, RankedTask, RenderKind, Result, Task, TaskList, TaskStore, UrgencyConfig,
};

/// Identifies a list in the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKey {
    Active,
    Completed,
    Custom(ListId),
}

impl ListKey {
    pub fn category(&self) -> ListCategory {
        match self {
            ListKey::Active => ListCategory::Active,
            ListKey::Completed => ListCategory::Completed,
            ListKey::Custom(_) => ListCategory::Custom,
        }
    }

    pub fn custom_id(&self) -> Option<ListId> {
        match self {
            ListKey::Custom(id) => Some(*id),
            _ => None,
        }
    }
}

/// Persisted form: `active`, `completed` or `list:<id>`.
impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKey::Active => write!(f, "active"),
            ListKey::Completed => write!(f, "completed"),
            ListKey::Custom(id) => write!(f, "list:{}", id),
        }
    }
}

impl FromStr for ListKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(ListKey::Active),
            "completed" => Ok(ListKey::Completed),
            other => other
                .strip_prefix("list:")
                .and_then(|id| id.parse().ok())
                .map(|id| ListKey::Custom(ListId(id)))
                .ok_or_else(|| format!("unknown list key '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListCategory {
    Active,
    Completed,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    Complete,
    Restore,
    Edit,
    AddToList,
    RemoveFromList,
    Delete,
}

impl ListCategory {
    /// Actions a host should offer for a task shown in this category.
    pub fn task_actions(&self) -> &'static [TaskAction] {
        use TaskAction::*;
        match self {
            ListCategory::Active => &[Complete, Edit, AddToList, Delete],
            ListCategory::Completed => &[Restore, Delete],
            ListCategory::Custom => &[Complete, Edit, AddToList, RemoveFromList, Delete],
        }
    }

    /// Whether new tasks may be created while this category is selected.
    pub fn accepts_new_tasks(&self) -> bool {
        !matches!(self, ListCategory::Completed)
    }
}

/// Where a view's tasks come from.
#[derive(Clone, Copy)]
pub enum ViewSource {
    /// Every stored task matching the predicate.
    Predicate(fn(&Task) -> bool),
    /// Incomplete members of a custom list.
    Membership(ListId),
}

impl fmt::Debug for ViewSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewSource::Predicate(_) => write!(f, "Predicate"),
            ViewSource::Membership(id) => f.debug_tuple("Membership").field(id).finish(),
        }
    }
}

fn is_open(task: &Task) -> bool {
    !task.completed
}

fn is_done(task: &Task) -> bool {
    task.completed
}

#[derive(Debug, Clone)]
pub struct ListView {
    pub key: ListKey,
    pub title: String,
    pub render_kind: RenderKind,
    pub source: ViewSource,
}

impl ListView {
    pub fn active() -> Self {
        Self {
            key: ListKey::Active,
            title: ACTIVE_LIST_TITLE.to_string(),
            render_kind: RenderKind::Colored,
            source: ViewSource::Predicate(is_open),
        }
    }

    pub fn completed() -> Self {
        Self {
            key: ListKey::Completed,
            title: COMPLETED_LIST_TITLE.to_string(),
            render_kind: RenderKind::Plain,
            source: ViewSource::Predicate(is_done),
        }
    }

    pub fn custom(list: &TaskList) -> Self {
        Self {
            key: ListKey::Custom(list.id),
            title: list.name.clone(),
            render_kind: list.render_kind,
            source: ViewSource::Membership(list.id),
        }
    }

    pub fn category(&self) -> ListCategory {
        self.key.category()
    }

    /// Unordered tasks currently in this view.
    pub fn tasks(&self, store: &dyn TaskStore) -> Result<Vec<Task>> {
        let tasks = match self.source {
            ViewSource::Predicate(keep) => store.all_tasks()?.into_iter().filter(keep).collect(),
            ViewSource::Membership(id) => store.tasks_in_list(id)?,
        };
        Ok(tasks)
    }

    /// Tasks classified at `now` and sorted for display.
    pub fn ranked(
        &self,
        store: &dyn TaskStore,
        now: DateTime<Utc>,
        config: &UrgencyConfig,
    ) -> Result<Vec<RankedTask>> {
        Ok(rank(self.tasks(store)?, now, config))
    }
}

pub fn rank(tasks: Vec<Task>, now: DateTime<Utc>, config: &UrgencyConfig) -> Vec<RankedTask> {
    let mut ranked: Vec<RankedTask> = tasks
        .into_iter()
        .map(|task| RankedTask {
            urgency: classify(task.priority, task.due, now, config),
            task,
        })
        .collect();
    comparator::sort(&mut ranked);
    ranked
}
