//! Urgency scoring: how pressing a task is given its priority and due date.
//!
//! `classify` is a pure function of its inputs. Views re-derive bands on
//! every render, so nothing here caches.

use chrono::{DateTime, Utc};
use poqt_constant::defaults;
use serde::{Deserialize, Serialize};

use crate::task::Priority;
use crate::{PoqtError, Result};

/// Discrete urgency classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyBand {
    None,
    Low,
    Mid,
    High,
    Due,
    Overdue,
}

impl UrgencyBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyBand::None => "none",
            UrgencyBand::Low => "low",
            UrgencyBand::Mid => "mid",
            UrgencyBand::High => "high",
            UrgencyBand::Due => "due",
            UrgencyBand::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for UrgencyBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Urgency {
    pub score: f64,
    pub band: UrgencyBand,
}

impl Urgency {
    pub const NONE: Urgency = Urgency {
        score: 0.0,
        band: UrgencyBand::None,
    };
}

/// Tunables for `classify`. Every field has a well-defined default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgencyConfig {
    /// Due dates further out than this contribute no urgency.
    pub time_window_minutes: i64,
    pub low_priority_weight: f64,
    pub normal_priority_weight: f64,
    pub high_priority_weight: f64,
    pub mid_threshold: f64,
    pub high_threshold: f64,
}

impl Default for UrgencyConfig {
    fn default() -> Self {
        Self {
            time_window_minutes: defaults::TIME_WINDOW_MINUTES,
            low_priority_weight: defaults::LOW_PRIORITY_WEIGHT,
            normal_priority_weight: defaults::NORMAL_PRIORITY_WEIGHT,
            high_priority_weight: defaults::HIGH_PRIORITY_WEIGHT,
            mid_threshold: defaults::MID_URGENCY_THRESHOLD,
            high_threshold: defaults::HIGH_URGENCY_THRESHOLD,
        }
    }
}

/// Keys of the flat option mapping understood by `UrgencyConfig::apply`.
pub mod keys {
    pub const TIME_WINDOW_MINUTES: &str = "urgency.time_window_minutes";
    pub const LOW_PRIORITY_WEIGHT: &str = "urgency.low_priority_weight";
    pub const NORMAL_PRIORITY_WEIGHT: &str = "urgency.normal_priority_weight";
    pub const HIGH_PRIORITY_WEIGHT: &str = "urgency.high_priority_weight";
    pub const MID_THRESHOLD: &str = "urgency.mid_threshold";
    pub const HIGH_THRESHOLD: &str = "urgency.high_threshold";

    pub const ALL: [&str; 6] = [
        TIME_WINDOW_MINUTES,
        LOW_PRIORITY_WEIGHT,
        NORMAL_PRIORITY_WEIGHT,
        HIGH_PRIORITY_WEIGHT,
        MID_THRESHOLD,
        HIGH_THRESHOLD,
    ];
}

impl UrgencyConfig {
    pub fn with_time_window_minutes(mut self, minutes: i64) -> Self {
        self.time_window_minutes = minutes;
        self
    }

    pub fn with_weights(mut self, low: f64, normal: f64, high: f64) -> Self {
        self.low_priority_weight = low;
        self.normal_priority_weight = normal;
        self.high_priority_weight = high;
        self
    }

    pub fn with_thresholds(mut self, mid: f64, high: f64) -> Self {
        self.mid_threshold = mid;
        self.high_threshold = high;
        self
    }

    pub fn weight(&self, priority: Priority) -> f64 {
        match priority {
            Priority::Low => self.low_priority_weight,
            Priority::Normal => self.normal_priority_weight,
            Priority::High => self.high_priority_weight,
        }
    }

    /// Saturation value used for overdue tasks.
    pub fn max_score(&self) -> f64 {
        self.low_priority_weight
            .max(self.normal_priority_weight)
            .max(self.high_priority_weight)
    }

    /// Set one option from its string form. Unknown keys are ignored and
    /// reported as `false`.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            keys::TIME_WINDOW_MINUTES => self.time_window_minutes = parse(key, value)?,
            keys::LOW_PRIORITY_WEIGHT => self.low_priority_weight = parse(key, value)?,
            keys::NORMAL_PRIORITY_WEIGHT => self.normal_priority_weight = parse(key, value)?,
            keys::HIGH_PRIORITY_WEIGHT => self.high_priority_weight = parse(key, value)?,
            keys::MID_THRESHOLD => self.mid_threshold = parse(key, value)?,
            keys::HIGH_THRESHOLD => self.high_threshold = parse(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Flat key/value form, in the same key order as `keys::ALL`.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (keys::TIME_WINDOW_MINUTES, self.time_window_minutes.to_string()),
            (keys::LOW_PRIORITY_WEIGHT, self.low_priority_weight.to_string()),
            (keys::NORMAL_PRIORITY_WEIGHT, self.normal_priority_weight.to_string()),
            (keys::HIGH_PRIORITY_WEIGHT, self.high_priority_weight.to_string()),
            (keys::MID_THRESHOLD, self.mid_threshold.to_string()),
            (keys::HIGH_THRESHOLD, self.high_threshold.to_string()),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=defaults::MAX_TIME_WINDOW_MINUTES).contains(&self.time_window_minutes) {
            return Err(PoqtError::Config(format!(
                "{} must be within [1, {}], got {}",
                keys::TIME_WINDOW_MINUTES,
                defaults::MAX_TIME_WINDOW_MINUTES,
                self.time_window_minutes
            )));
        }
        for (key, weight) in [
            (keys::LOW_PRIORITY_WEIGHT, self.low_priority_weight),
            (keys::NORMAL_PRIORITY_WEIGHT, self.normal_priority_weight),
            (keys::HIGH_PRIORITY_WEIGHT, self.high_priority_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(PoqtError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    key, weight
                )));
            }
        }
        for (key, threshold) in [
            (keys::MID_THRESHOLD, self.mid_threshold),
            (keys::HIGH_THRESHOLD, self.high_threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(PoqtError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    key, threshold
                )));
            }
        }
        if self.mid_threshold > self.high_threshold {
            return Err(PoqtError::Config(format!(
                "{} ({}) must not exceed {} ({})",
                keys::MID_THRESHOLD,
                self.mid_threshold,
                keys::HIGH_THRESHOLD,
                self.high_threshold
            )));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| PoqtError::Config(format!("invalid value '{}' for {}", value, key)))
}

/// Classify a task. Callers map a missing priority to `Priority::Normal`.
pub fn classify(
    priority: Priority,
    due: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    config: &UrgencyConfig,
) -> Urgency {
    let Some(due) = due else {
        return Urgency::NONE;
    };

    if now >= due {
        return Urgency {
            score: config.max_score(),
            band: UrgencyBand::Overdue,
        };
    }

    let remaining_ms = (due - now).num_milliseconds();
    let weight = config.weight(priority);

    if remaining_ms <= defaults::DUE_TOLERANCE_SECS * 1000 {
        return Urgency {
            score: weight,
            band: UrgencyBand::Due,
        };
    }

    let window_ms = config.time_window_minutes.max(1) as f64 * 60_000.0;
    let u = (1.0 - remaining_ms as f64 / window_ms).clamp(0.0, 1.0);
    let score = u * weight;

    let band = if score >= config.high_threshold {
        UrgencyBand::High
    } else if score >= config.mid_threshold {
        UrgencyBand::Mid
    } else {
        UrgencyBand::Low
    };

    Urgency { score, band }
}
