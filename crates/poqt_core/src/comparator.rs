//! Display ordering for tasks.
//!
//! Due dates compare at minute granularity, undated tasks sort last, then
//! higher urgency first, then lower id first. The order is total, so sorting
//! is deterministic.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Task;
use crate::urgency::Urgency;

/// A task together with its urgency at the time the view was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTask {
    pub task: Task,
    pub urgency: Urgency,
}

/// Minutes since the Unix epoch, flooring sub-minute parts.
pub fn due_minute(due: DateTime<Utc>) -> i64 {
    due.timestamp().div_euclid(60)
}

pub fn compare(a: &RankedTask, b: &RankedTask) -> Ordering {
    let by_due = match (a.task.due, b.task.due) {
        (Some(x), Some(y)) => due_minute(x).cmp(&due_minute(y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_due
        .then_with(|| b.urgency.score.total_cmp(&a.urgency.score))
        .then_with(|| a.task.id.cmp(&b.task.id))
}

/// Sort in display order.
pub fn sort(tasks: &mut [RankedTask]) {
    tasks.sort_by(compare);
}
