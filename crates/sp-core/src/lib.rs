//! Core planning logic for the study planner.
//!
//! This crate turns an ordered topic list and a set of constraints into a
//! day-by-day study schedule:
//! - Resolution: coercing loose input into typed constraints
//! - Availability: enumerating eligible study dates
//! - Load balancing: compressing topics that cannot fit before the deadline
//! - Allocation: greedily placing topic hours onto dates
//!
//! Everything here is pure; storage and topic extraction live elsewhere.

mod allocation;
mod availability;
mod error;
mod plan;
pub mod progress;
mod resolve;
mod scale;
mod topic;
pub mod types;

pub use allocation::{Allocator, ScheduleEntry, SchedulerState, Step};
pub use availability::study_dates;
pub use error::PlanError;
pub use plan::{Schedule, generate_schedule, schedule_topics};
pub use progress::{ComplexityLevel, PlanProgress, TrackedItem};
pub use resolve::{
    Constraints, MIN_DAILY_HOURS, PlanRequest, ResolvedPlan, StudyDaysInput, resolve,
};
pub use scale::LoadBalance;
pub use topic::{NumericInput, RawTopic, Topic};
pub use types::{Complexity, Hours, StudyDays, TopicId, ValidationError, Weekday};
