//! Greedy allocation of topic hours onto study dates.
//!
//! # Algorithm Summary
//!
//! A forward merge of two sequences. A topic cursor walks the (scaled) topic
//! hours and a date cursor walks the eligible dates, each carrying how much of
//! the current item is left. Every step emits `min(topic_remaining,
//! date_remaining)` hours for the current pair and advances whichever cursor
//! ran dry (both on a tie). Amounts at or below [`HOURS_EPSILON`] count as
//! exhausted, so floating drift never produces a zero-length entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::types::{HOURS_EPSILON, Hours, TopicId};

/// One block of study time for a topic on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub topic_id: TopicId,

    #[serde(rename = "study_date")]
    pub date: NaiveDate,

    pub duration_hours: Hours,
}

/// Cursor state threaded through [`Allocator::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerState {
    /// Index of the topic being scheduled.
    pub topic_cursor: usize,
    /// Hours of the current topic not yet placed.
    pub topic_remaining: Hours,
    /// Index of the date being filled.
    pub date_cursor: usize,
    /// Hours still free on the current date.
    pub date_remaining: Hours,
}

/// Result of a single allocation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// An entry was produced.
    Emitted(ScheduleEntry),
    /// An exhausted cursor was advanced without producing an entry.
    Skipped,
    /// Every topic has been placed.
    Finished,
}

/// Places an ordered list of topic workloads onto an ordered list of dates.
#[derive(Debug, Clone)]
pub struct Allocator<'a> {
    work: Vec<(TopicId, Hours)>,
    dates: &'a [NaiveDate],
    daily_budget: Hours,
}

impl<'a> Allocator<'a> {
    /// `work` pairs each topic with the hours to place, in schedule order.
    pub const fn new(
        work: Vec<(TopicId, Hours)>,
        dates: &'a [NaiveDate],
        daily_budget: Hours,
    ) -> Self {
        Self {
            work,
            dates,
            daily_budget,
        }
    }

    /// State before any step: first topic loaded, first date full.
    pub fn initial_state(&self) -> SchedulerState {
        SchedulerState {
            topic_cursor: 0,
            topic_remaining: self.topic_hours(0),
            date_cursor: 0,
            date_remaining: self.daily_budget,
        }
    }

    /// Advances the merge by one step.
    pub fn step(&self, state: &mut SchedulerState) -> Result<Step, PlanError> {
        let Some((topic_id, _)) = self.work.get(state.topic_cursor) else {
            return Ok(Step::Finished);
        };

        if !state.topic_remaining.is_positive() {
            self.advance_topic(state);
            return Ok(Step::Skipped);
        }

        let Some(&date) = self.dates.get(state.date_cursor) else {
            return Err(PlanError::SchedulingOverflow {
                topic_id: topic_id.clone(),
                remaining_hours: state.topic_remaining.get(),
            });
        };

        if !state.date_remaining.is_positive() {
            self.advance_date(state);
            return Ok(Step::Skipped);
        }

        let amount = state.topic_remaining.min(state.date_remaining);
        let entry = ScheduleEntry {
            topic_id: topic_id.clone(),
            date,
            duration_hours: amount,
        };

        state.topic_remaining = state.topic_remaining.saturating_sub(amount);
        state.date_remaining = state.date_remaining.saturating_sub(amount);

        if !state.topic_remaining.is_positive() {
            self.advance_topic(state);
        }
        if !state.date_remaining.is_positive() {
            self.advance_date(state);
        }

        Ok(Step::Emitted(entry))
    }

    /// Runs steps until every topic is placed.
    pub fn run(&self) -> Result<Vec<ScheduleEntry>, PlanError> {
        let mut state = self.initial_state();
        let mut entries = Vec::new();
        loop {
            match self.step(&mut state)? {
                Step::Emitted(entry) => entries.push(entry),
                Step::Skipped => {}
                Step::Finished => break,
            }
        }
        tracing::debug!(
            entries = entries.len(),
            dates_used = state.date_cursor.min(self.dates.len()),
            epsilon = HOURS_EPSILON,
            "allocation finished"
        );
        Ok(entries)
    }

    fn topic_hours(&self, index: usize) -> Hours {
        self.work.get(index).map_or(Hours::ZERO, |(_, hours)| *hours)
    }

    fn advance_topic(&self, state: &mut SchedulerState) {
        state.topic_cursor += 1;
        state.topic_remaining = self.topic_hours(state.topic_cursor);
    }

    const fn advance_date(&self, state: &mut SchedulerState) {
        state.date_cursor += 1;
        state.date_remaining = self.daily_budget;
    }
}
