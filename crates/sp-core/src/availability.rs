//! Eligible study date enumeration.

use chrono::{Datelike, NaiveDate};

use crate::error::PlanError;
use crate::types::{StudyDays, Weekday};

/// Lists every date in `[start, deadline]` whose weekday is allowed, ascending.
///
/// Works on civil dates only, so month and year boundaries (and DST) cannot
/// skip or repeat a day.
pub fn study_dates(
    start: NaiveDate,
    deadline: NaiveDate,
    allowed: StudyDays,
) -> Result<Vec<NaiveDate>, PlanError> {
    let dates: Vec<NaiveDate> = start
        .iter_days()
        .take_while(|date| *date <= deadline)
        .filter(|date| allowed.contains(Weekday::from(date.weekday())))
        .collect();

    if dates.is_empty() {
        return Err(PlanError::NoAvailableDays { start, deadline });
    }
    Ok(dates)
}
