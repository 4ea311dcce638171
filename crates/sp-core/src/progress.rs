//! Completion tracking over stored schedule items.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{Complexity, Hours};

/// Complexity assumed for topics that did not report one.
pub const DEFAULT_COMPLEXITY: u8 = 3;

/// A schedule item whose completion can be tracked.
///
/// Lets progress work over storage rows as well as test fixtures.
pub trait TrackedItem {
    fn is_completed(&self) -> bool;

    fn duration_hours(&self) -> Hours;
}

/// How far through its schedule a plan is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanProgress {
    pub completed_items: usize,
    pub total_items: usize,
    pub completed_hours: Hours,
    pub total_hours: Hours,
}

impl PlanProgress {
    pub fn from_items<T: TrackedItem>(items: &[T]) -> Self {
        let mut progress = Self {
            completed_items: 0,
            total_items: items.len(),
            completed_hours: Hours::ZERO,
            total_hours: Hours::ZERO,
        };
        for item in items {
            progress.total_hours += item.duration_hours();
            if item.is_completed() {
                progress.completed_items += 1;
                progress.completed_hours += item.duration_hours();
            }
        }
        progress
    }

    /// Share of completed items, rounded to a whole percent.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn percent(&self) -> u8 {
        if self.total_items == 0 {
            return 0;
        }
        let ratio = self.completed_items as f64 / self.total_items as f64;
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// A plan is complete once it has items and all of them are done.
    pub const fn is_complete(&self) -> bool {
        self.total_items > 0 && self.completed_items == self.total_items
    }
}

/// Coarse difficulty label for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Easy,
    Medium,
    Hard,
}

impl ComplexityLevel {
    pub fn from_average(average: f64) -> Self {
        if average <= 2.0 {
            Self::Easy
        } else if average <= 4.0 {
            Self::Medium
        } else {
            Self::Hard
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        };
        write!(f, "{s}")
    }
}

/// Mean complexity, counting unknown values as [`DEFAULT_COMPLEXITY`].
#[allow(clippy::cast_precision_loss)]
pub fn average_complexity<I>(complexities: I) -> f64
where
    I: IntoIterator<Item = Option<Complexity>>,
{
    let (sum, count) = complexities
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), c| {
            let value = c.map_or(DEFAULT_COMPLEXITY, Complexity::get);
            (sum + u64::from(value), count + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Whole days from `today` until `deadline`; negative once it has passed.
pub fn days_remaining(today: NaiveDate, deadline: NaiveDate) -> i64 {
    (deadline - today).num_days()
}
