//! Default values for preferences. Written to the config table on first open.

/// How far ahead (minutes) a due date starts contributing urgency.
pub const TIME_WINDOW_MINUTES: i64 = 24 * 60;
/// Largest accepted window: ten years.
pub const MAX_TIME_WINDOW_MINUTES: i64 = 10 * 365 * 24 * 60;

pub const LOW_PRIORITY_WEIGHT: f64 = 0.4;
pub const NORMAL_PRIORITY_WEIGHT: f64 = 0.7;
pub const HIGH_PRIORITY_WEIGHT: f64 = 1.0;

/// Score at or above which a task is MID urgency.
pub const MID_URGENCY_THRESHOLD: f64 = 0.4;
/// Score at or above which a task is HIGH urgency.
pub const HIGH_URGENCY_THRESHOLD: f64 = 0.7;

/// Band tolerance: a task due within this many seconds is DUE rather than scored.
pub const DUE_TOLERANCE_SECS: i64 = 60;

/// Hour of day used when a due date is given without a time.
pub const DEFAULT_DUE_HOUR: u32 = 9;
