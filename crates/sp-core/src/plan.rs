//! End-to-end schedule generation.
//!
//! Composes the four stages strictly left to right:
//! resolve → study dates → load balance → allocate.

use chrono::NaiveDate;
use serde::Serialize;

use crate::allocation::{Allocator, ScheduleEntry};
use crate::availability::study_dates;
use crate::error::PlanError;
use crate::resolve::{Constraints, PlanRequest, resolve};
use crate::scale::LoadBalance;
use crate::topic::Topic;
use crate::types::Hours;

/// A generated schedule plus the figures needed to explain it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    /// Entries ordered by date, then by topic sequence within a date.
    pub entries: Vec<ScheduleEntry>,

    #[serde(flatten)]
    pub balance: LoadBalance,

    /// Number of eligible study dates between today and the deadline.
    pub study_date_count: usize,
}

impl Schedule {
    pub const fn scale_factor(&self) -> f64 {
        self.balance.scale_factor
    }

    /// Whether topics were allotted less time than estimated.
    pub fn is_compressed(&self) -> bool {
        self.balance.is_compressed()
    }
}

/// Builds a schedule from an unvalidated request.
///
/// Pure and idempotent: the same request and `today` always yield the same
/// schedule.
pub fn generate_schedule(request: &PlanRequest, today: NaiveDate) -> Result<Schedule, PlanError> {
    let resolved = resolve(request, today)?;
    schedule_topics(&resolved.topics, &resolved.constraints, today)
}

/// Builds a schedule from already-resolved topics and constraints.
///
/// Repeats the deadline and workload checks of [`resolve`], so callers that
/// assemble `Constraints` themselves get the same failures.
pub fn schedule_topics(
    topics: &[Topic],
    constraints: &Constraints,
    today: NaiveDate,
) -> Result<Schedule, PlanError> {
    if constraints.deadline <= today {
        return Err(PlanError::DeadlineInPast {
            deadline: constraints.deadline,
            today,
        });
    }
    let total: Hours = topics.iter().map(|t| t.estimated_hours).sum();
    if !total.is_positive() {
        return Err(PlanError::EmptyWorkload);
    }

    let dates = study_dates(today, constraints.deadline, constraints.allowed_weekdays)?;
    let balance = LoadBalance::compute(topics, dates.len(), constraints.daily_hours_budget)?;

    if balance.is_compressed() {
        tracing::warn!(
            scale_factor = balance.scale_factor,
            demand_hours = balance.total_demand_hours.get(),
            available_hours = balance.total_available_hours.get(),
            "not enough study time before the deadline, compressing topics"
        );
    } else {
        tracing::debug!(
            demand_hours = balance.total_demand_hours.get(),
            available_hours = balance.total_available_hours.get(),
            "plan fits without compression"
        );
    }

    let work = topics
        .iter()
        .map(|t| t.id.clone())
        .zip(balance.scaled_hours(topics))
        .collect();
    let entries = Allocator::new(work, &dates, constraints.daily_hours_budget).run()?;

    Ok(Schedule {
        entries,
        balance,
        study_date_count: dates.len(),
    })
}
