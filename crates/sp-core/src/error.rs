//! Planning errors.

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::TopicId;

/// Errors raised while turning a topic list into a schedule.
///
/// None of these are retried; a failed call produces no schedule at all.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    /// The request could not be normalized.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The deadline is today or earlier.
    #[error("deadline {deadline} must be after today ({today})")]
    DeadlineInPast { deadline: NaiveDate, today: NaiveDate },

    /// Every topic is estimated at zero hours.
    #[error("total estimated hours is zero")]
    EmptyWorkload,

    /// No allowed weekday falls between today and the deadline.
    #[error("no study days available between {start} and {deadline}")]
    NoAvailableDays { start: NaiveDate, deadline: NaiveDate },

    /// The allocator ran out of dates with work left over.
    ///
    /// Unreachable when topic hours have been scaled to fit; seeing it means a bug.
    #[error("ran out of study dates with {remaining_hours:.4}h left for topic {topic_id}")]
    SchedulingOverflow {
        topic_id: TopicId,
        remaining_hours: f64,
    },
}

impl PlanError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
