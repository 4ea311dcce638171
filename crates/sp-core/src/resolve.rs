//! Constraint resolution: raw planning input to typed domain values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::topic::{NumericInput, RawTopic, Topic};
use crate::types::{Hours, StudyDays, TopicId, Weekday};

/// Daily budgets below this are raised to it rather than rejected.
pub const MIN_DAILY_HOURS: f64 = 0.5;

/// Study days as a list (`[1, 3, "5"]`) or a comma-separated string (`"1,3,5"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudyDaysInput {
    List(Vec<NumericInput>),
    Text(String),
}

impl StudyDaysInput {
    /// Collects every entry that is an integer in 0-6. Anything else is dropped.
    pub fn to_study_days(&self) -> StudyDays {
        match self {
            Self::List(items) => items
                .iter()
                .filter_map(NumericInput::as_integer)
                .filter_map(|index| Weekday::from_index(index).ok())
                .collect(),
            Self::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .filter_map(|part| NumericInput::from(part).as_integer())
                .filter_map(|index| Weekday::from_index(index).ok())
                .collect(),
        }
    }
}

impl From<&str> for StudyDaysInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<StudyDays> for StudyDaysInput {
    fn from(days: StudyDays) -> Self {
        Self::List(
            days.iter()
                .map(|day| NumericInput::Number(f64::from(day.index())))
                .collect(),
        )
    }
}

/// Everything a caller supplies to plan one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub topics: Vec<RawTopic>,
    pub deadline: NaiveDate,
    pub daily_hours: NumericInput,
    pub study_days: StudyDaysInput,
}

/// Normalized scheduling constraints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    /// Last date (inclusive) that may receive work.
    pub deadline: NaiveDate,
    pub daily_hours_budget: Hours,
    pub allowed_weekdays: StudyDays,
}

/// Output of [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlan {
    pub constraints: Constraints,
    pub topics: Vec<Topic>,
}

impl ResolvedPlan {
    pub fn total_hours(&self) -> Hours {
        self.topics.iter().map(|t| t.estimated_hours).sum()
    }
}

/// Validates a request against `today`.
///
/// Checks run in a fixed order: topics present, study days valid, deadline in
/// the future, non-zero workload.
pub fn resolve(request: &PlanRequest, today: NaiveDate) -> Result<ResolvedPlan, PlanError> {
    if request.topics.is_empty() {
        return Err(PlanError::invalid("topic list is empty"));
    }

    let topics = request
        .topics
        .iter()
        .map(resolve_topic)
        .collect::<Result<Vec<_>, _>>()?;

    let allowed_weekdays = request.study_days.to_study_days();
    if allowed_weekdays.is_empty() {
        return Err(PlanError::invalid(
            "study days must include at least one weekday between 0 (Sunday) and 6 (Saturday)",
        ));
    }

    if request.deadline <= today {
        return Err(PlanError::DeadlineInPast {
            deadline: request.deadline,
            today,
        });
    }

    let total: Hours = topics.iter().map(|t| t.estimated_hours).sum();
    if !total.is_positive() {
        return Err(PlanError::EmptyWorkload);
    }

    let daily_hours_budget = resolve_daily_hours(&request.daily_hours)?;

    tracing::debug!(
        topics = topics.len(),
        total_hours = total.get(),
        daily_hours = daily_hours_budget.get(),
        study_days = %allowed_weekdays,
        %today,
        deadline = %request.deadline,
        "resolved plan constraints"
    );

    Ok(ResolvedPlan {
        constraints: Constraints {
            deadline: request.deadline,
            daily_hours_budget,
            allowed_weekdays,
        },
        topics,
    })
}

fn resolve_topic(raw: &RawTopic) -> Result<Topic, PlanError> {
    let id = TopicId::new(raw.id.clone()).map_err(|err| PlanError::invalid(err.to_string()))?;
    Ok(Topic {
        id,
        name: raw.name.clone(),
        estimated_hours: raw.estimated_hours.coerce_hours(),
        complexity: raw.coerce_complexity(),
    })
}

fn resolve_daily_hours(input: &NumericInput) -> Result<Hours, PlanError> {
    let value = input.coerce();
    if !value.is_finite() {
        return Err(PlanError::invalid(format!(
            "daily hours must be a finite number, got {value}"
        )));
    }
    if value < MIN_DAILY_HOURS {
        tracing::debug!(
            requested = value,
            floor = MIN_DAILY_HOURS,
            "raising daily hours to minimum"
        );
    }
    Hours::new(value.max(MIN_DAILY_HOURS)).map_err(|err| PlanError::invalid(err.to_string()))
}
