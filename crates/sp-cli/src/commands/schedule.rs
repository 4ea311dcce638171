//! Schedule preview command.
//!
//! Runs the planner over a topic file and prints the result without storing
//! anything.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::Args;
use serde::Serialize;
use sp_core::{
    NumericInput, PlanRequest, RawTopic, ResolvedPlan, Schedule, StudyDaysInput, Weekday,
    resolve, schedule_topics,
};

use super::util::{format_hours, parse_deadline, today_or};
use crate::Config;
use crate::topics::load_topics;

/// Constraint flags shared by `schedule` and `create`.
#[derive(Debug, Args)]
pub struct PlanningArgs {
    /// Deadline as YYYY-MM-DD or relative ("3 weeks", "10 days").
    #[arg(long)]
    pub deadline: String,

    /// Study hours per day [default: from config].
    #[arg(long)]
    pub daily_hours: Option<String>,

    /// Comma-separated weekdays, 0 = Sunday ("1,3,5") [default: from config].
    #[arg(long)]
    pub study_days: Option<String>,

    /// Plan as if today were this date (YYYY-MM-DD).
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

impl PlanningArgs {
    /// Resolves the effective start date and builds a planner request.
    pub fn to_request(
        &self,
        topics: Vec<RawTopic>,
        config: &Config,
    ) -> Result<(PlanRequest, NaiveDate)> {
        let today = today_or(self.today);
        let deadline = parse_deadline(&self.deadline, today)?;
        let daily_hours = self
            .daily_hours
            .as_deref()
            .map_or(NumericInput::Number(config.daily_hours), NumericInput::from);
        let study_days =
            StudyDaysInput::from(self.study_days.as_deref().unwrap_or(&config.study_days));

        let request = PlanRequest {
            topics,
            deadline,
            daily_hours,
            study_days,
        };
        Ok((request, today))
    }
}

/// Resolves and schedules a request in one go.
pub fn plan(request: &PlanRequest, today: NaiveDate) -> Result<(ResolvedPlan, Schedule)> {
    let resolved = resolve(request, today).context("cannot plan these topics")?;
    let schedule = schedule_topics(&resolved.topics, &resolved.constraints, today)
        .context("cannot build schedule")?;
    Ok((resolved, schedule))
}

#[derive(Debug, Args)]
pub struct ScheduleArgs {
    /// JSON topic file.
    #[arg(long)]
    pub topics: PathBuf,

    #[command(flatten)]
    pub planning: PlanningArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct TopicSummary<'a> {
    id: &'a str,
    name: &'a str,
    estimated_hours: f64,
    scaled_hours: f64,
}

#[derive(Debug, Serialize)]
struct ScheduleOutput<'a> {
    today: NaiveDate,
    deadline: NaiveDate,
    daily_hours: f64,
    study_days: String,
    topics: Vec<TopicSummary<'a>>,
    #[serde(flatten)]
    schedule: &'a Schedule,
}

pub fn run<W: Write>(writer: &mut W, args: &ScheduleArgs, config: &Config) -> Result<()> {
    let (entries, _) = load_topics(&args.topics)?;
    let topics: Vec<RawTopic> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| entry.to_raw_topic(format!("topic-{}", i + 1)))
        .collect();

    let (request, today) = args.planning.to_request(topics, config)?;
    let (resolved, schedule) = plan(&request, today)?;

    if args.json {
        let scaled = schedule.balance.scaled_hours(&resolved.topics);
        let output = ScheduleOutput {
            today,
            deadline: resolved.constraints.deadline,
            daily_hours: resolved.constraints.daily_hours_budget.get(),
            study_days: resolved.constraints.allowed_weekdays.to_string(),
            topics: resolved
                .topics
                .iter()
                .zip(scaled)
                .map(|(topic, hours)| TopicSummary {
                    id: topic.id.as_str(),
                    name: topic.name.as_deref().unwrap_or_default(),
                    estimated_hours: topic.estimated_hours.get(),
                    scaled_hours: hours.get(),
                })
                .collect(),
            schedule: &schedule,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    write_schedule(writer, &resolved, &schedule)
}

/// Writes a schedule grouped by study date.
pub fn write_schedule<W: Write>(
    writer: &mut W,
    resolved: &ResolvedPlan,
    schedule: &Schedule,
) -> Result<()> {
    let names: HashMap<&str, &str> = resolved
        .topics
        .iter()
        .map(|t| (t.id.as_str(), t.name.as_deref().unwrap_or_else(|| t.id.as_str())))
        .collect();

    let days_used = schedule.entries.chunk_by(|a, b| a.date == b.date).count();
    writeln!(
        writer,
        "{} topics, {} over {} of {} study days (deadline {})",
        resolved.topics.len(),
        format_hours(schedule.balance.total_demand_hours.get()),
        days_used,
        schedule.study_date_count,
        resolved.constraints.deadline,
    )?;
    if schedule.is_compressed() {
        write_compression_warning(writer, schedule)?;
    }

    for day in schedule.entries.chunk_by(|a, b| a.date == b.date) {
        writeln!(writer)?;
        writeln!(
            writer,
            "{} {}",
            day[0].date,
            Weekday::from(day[0].date.weekday()).short_name()
        )?;
        for entry in day {
            let name = names
                .get(entry.topic_id.as_str())
                .copied()
                .unwrap_or_else(|| entry.topic_id.as_str());
            writeln!(
                writer,
                "  {:<32} {:>8}",
                name,
                format_hours(entry.duration_hours.get())
            )?;
        }
    }

    Ok(())
}

/// Warns that topics were shrunk to fit the available study time.
pub fn write_compression_warning<W: Write>(writer: &mut W, schedule: &Schedule) -> Result<()> {
    writeln!(
        writer,
        "Warning: only {} of study time is available before the deadline; \
         every topic is scaled to {:.0}% of its estimate.",
        format_hours(schedule.balance.total_available_hours.get()),
        schedule.scale_factor() * 100.0,
    )?;
    Ok(())
}
