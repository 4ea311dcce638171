//! Show command: plan summary and checklist.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use sp_core::progress::{average_complexity, days_remaining};
use sp_core::{Complexity, ComplexityLevel, PlanProgress, StudyDaysInput, Weekday};
use sp_db::{FullPlan, ScheduleItemRecord, TopicRecord};

use super::util::{find_plan, format_hours, open_database, progress_bar, short_id, today_or};
use crate::Config;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Plan ID (or unique prefix).
    pub plan_id: String,

    /// Count days remaining from this date instead of today.
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Derived figures for a stored plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanStats {
    pub progress: PlanProgress,
    pub average_complexity: f64,
    pub complexity_level: ComplexityLevel,
    pub days_remaining: i64,
}

impl PlanStats {
    pub fn compute(plan: &FullPlan, today: NaiveDate) -> Self {
        let average = average_complexity(plan.topics.iter().map(|topic| {
            topic
                .complexity
                .and_then(|c| Complexity::new(i64::from(c)).ok())
        }));
        Self {
            progress: PlanProgress::from_items(&plan.items),
            average_complexity: average,
            complexity_level: ComplexityLevel::from_average(average),
            days_remaining: days_remaining(today, plan.plan.deadline),
        }
    }
}

#[derive(Debug, Serialize)]
struct TopicOutput<'a> {
    id: &'a str,
    topic_name: &'a str,
    subtopics: &'a [String],
    estimated_hours: f64,
    complexity: Option<u8>,
    sequence_order: i64,
}

impl<'a> From<&'a TopicRecord> for TopicOutput<'a> {
    fn from(topic: &'a TopicRecord) -> Self {
        Self {
            id: &topic.id,
            topic_name: &topic.topic_name,
            subtopics: &topic.subtopics,
            estimated_hours: topic.estimated_hours,
            complexity: topic.complexity,
            sequence_order: topic.sequence_order,
        }
    }
}

#[derive(Debug, Serialize)]
struct ItemOutput<'a> {
    id: i64,
    topic_id: &'a str,
    topic_name: &'a str,
    study_date: NaiveDate,
    duration_hours: f64,
    is_completed: bool,
    completed_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a ScheduleItemRecord> for ItemOutput<'a> {
    fn from(item: &'a ScheduleItemRecord) -> Self {
        Self {
            id: item.id,
            topic_id: &item.topic_id,
            topic_name: &item.topic_name,
            study_date: item.study_date,
            duration_hours: item.duration_hours,
            is_completed: item.is_completed,
            completed_at: item.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    id: &'a str,
    title: &'a str,
    original_filename: Option<&'a str>,
    deadline: NaiveDate,
    daily_hours: f64,
    study_days: &'a str,
    scale_factor: f64,
    created_at: DateTime<Utc>,
    #[serde(flatten)]
    stats: &'a PlanStats,
    topics: Vec<TopicOutput<'a>>,
    items: Vec<ItemOutput<'a>>,
}

pub fn run<W: Write>(writer: &mut W, args: &ShowArgs, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let record = find_plan(&db, &args.plan_id)?;
    let plan = db
        .get_plan(&record.id)?
        .with_context(|| format!("plan not found: {}", record.id))?;
    let stats = PlanStats::compute(&plan, today_or(args.today));

    if args.json {
        let output = PlanOutput {
            id: &plan.plan.id,
            title: &plan.plan.title,
            original_filename: plan.plan.original_filename.as_deref(),
            deadline: plan.plan.deadline,
            daily_hours: plan.plan.daily_hours,
            study_days: &plan.plan.study_days,
            scale_factor: plan.plan.scale_factor,
            created_at: plan.plan.created_at,
            stats: &stats,
            topics: plan.topics.iter().map(TopicOutput::from).collect(),
            items: plan.items.iter().map(ItemOutput::from).collect(),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    write_plan(writer, &plan, &stats)
}

fn describe_days_remaining(days: i64) -> String {
    match days {
        0 => "due today".to_string(),
        1 => "1 day left".to_string(),
        -1 => "1 day overdue".to_string(),
        d if d < 0 => format!("{} days overdue", -d),
        d => format!("{d} days left"),
    }
}

fn weekday_names(study_days: &str) -> String {
    StudyDaysInput::from(study_days)
        .to_study_days()
        .iter()
        .map(Weekday::short_name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_plan<W: Write>(writer: &mut W, plan: &FullPlan, stats: &PlanStats) -> Result<()> {
    let record = &plan.plan;
    let progress = &stats.progress;

    writeln!(writer, "{} ({})", record.title, short_id(&record.id))?;
    writeln!(
        writer,
        "Deadline:   {} ({})",
        record.deadline,
        describe_days_remaining(stats.days_remaining)
    )?;
    writeln!(
        writer,
        "Schedule:   {}/day on {}",
        format_hours(record.daily_hours),
        weekday_names(&record.study_days)
    )?;
    writeln!(
        writer,
        "Topics:     {}, {} total, avg complexity {:.1} ({})",
        plan.topics.len(),
        format_hours(plan.total_estimated_hours()),
        stats.average_complexity,
        stats.complexity_level
    )?;
    writeln!(
        writer,
        "Progress:   {} {}% ({}/{} sessions, {} of {})",
        progress_bar(progress.percent()),
        progress.percent(),
        progress.completed_items,
        progress.total_items,
        format_hours(progress.completed_hours.get()),
        format_hours(progress.total_hours.get())
    )?;
    if record.scale_factor < 1.0 {
        writeln!(
            writer,
            "Note: topics were scaled to {:.0}% of their estimates to fit the deadline.",
            record.scale_factor * 100.0
        )?;
    }

    for day in plan.items.chunk_by(|a, b| a.study_date == b.study_date) {
        writeln!(writer)?;
        writeln!(
            writer,
            "{} {}",
            day[0].study_date,
            Weekday::from(day[0].study_date.weekday()).short_name()
        )?;
        for item in day {
            writeln!(
                writer,
                "  [{}] #{:<4} {:<28} {:>8}",
                if item.is_completed { "x" } else { " " },
                item.id,
                item.topic_name,
                format_hours(item.duration_hours)
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use sp_db::{Database, NewScheduleItem, PlanRecord};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn topic(id: &str, name: &str, hours: f64, complexity: Option<u8>, order: i64) -> TopicRecord {
        TopicRecord {
            id: id.to_string(),
            plan_id: "c0ffee00-plan".to_string(),
            topic_name: name.to_string(),
            subtopics: Vec::new(),
            estimated_hours: hours,
            complexity,
            sequence_order: order,
        }
    }

    fn item(topic_id: &str, study_date: NaiveDate, hours: f64) -> NewScheduleItem {
        NewScheduleItem {
            topic_id: topic_id.to_string(),
            study_date,
            duration_hours: hours,
        }
    }

    fn setup(scale_factor: f64) -> (tempfile::TempDir, Config) {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("sp.db"),
            ..Config::default()
        };
        let mut db = Database::open(&config.database_path).unwrap();
        let plan = PlanRecord {
            id: "c0ffee00-plan".to_string(),
            title: "Calculus".to_string(),
            original_filename: Some("calc.json".to_string()),
            original_content: None,
            deadline: date(2025, 3, 8),
            daily_hours: 2.0,
            study_days: "1,3,5".to_string(),
            scale_factor,
            created_at: "2025-03-01T09:00:00Z".parse().unwrap(),
        };
        db.insert_plan(
            &plan,
            &[
                topic("t1", "Limits", 3.0, Some(2), 1),
                topic("t2", "Derivatives", 2.0, Some(5), 2),
            ],
            &[
                item("t1", date(2025, 3, 3), 2.0),
                item("t1", date(2025, 3, 5), 1.0),
                item("t2", date(2025, 3, 5), 1.0),
                item("t2", date(2025, 3, 7), 1.0),
            ],
        )
        .unwrap();
        let first = db.list_schedule_items("c0ffee00-plan").unwrap()[0].id;
        db.set_schedule_item_completed(first, true, "2025-03-03T18:00:00Z".parse().unwrap())
            .unwrap();
        (temp, config)
    }

    fn show_args(plan_id: &str, json: bool) -> ShowArgs {
        ShowArgs {
            plan_id: plan_id.to_string(),
            today: Some(date(2025, 3, 4)),
            json,
        }
    }

    #[test]
    fn show_prints_summary_and_checklist() {
        let (_temp, config) = setup(1.0);
        let mut output = Vec::new();
        run(&mut output, &show_args("c0ffee", false), &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Calculus (c0ffee00)
        Deadline:   2025-03-08 (4 days left)
        Schedule:   2h/day on Mon, Wed, Fri
        Topics:     2, 5h total, avg complexity 3.5 (Medium)
        Progress:   ███░░░░░░░ 25% (1/4 sessions, 2h of 5h)

        2025-03-03 Mon
          [x] #1    Limits                             2h

        2025-03-05 Wed
          [ ] #2    Limits                             1h
          [ ] #3    Derivatives                        1h

        2025-03-07 Fri
          [ ] #4    Derivatives                        1h
        ");
    }

    #[test]
    fn show_notes_compression() {
        let (_temp, config) = setup(0.8);
        let mut output = Vec::new();
        run(&mut output, &show_args("c0ffee00-plan", false), &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("scaled to 80% of their estimates"), "{output}");
    }

    #[test]
    fn show_json_includes_stats() {
        let (_temp, config) = setup(1.0);
        let mut output = Vec::new();
        run(&mut output, &show_args("c0ffee00-plan", true), &config).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["title"], "Calculus");
        assert_eq!(value["days_remaining"], 4);
        assert_eq!(value["average_complexity"], 3.5);
        assert_eq!(value["complexity_level"], "medium");
        assert_eq!(value["progress"]["completed_items"], 1);
        assert_eq!(value["progress"]["total_hours"], 5.0);
        assert_eq!(value["topics"][1]["topic_name"], "Derivatives");
        assert_eq!(value["items"][0]["is_completed"], true);
        assert_eq!(value["items"][0]["completed_at"], "2025-03-03T18:00:00Z");
        assert_eq!(value["items"][1]["completed_at"], serde_json::Value::Null);
    }

    #[test]
    fn show_unknown_plan_fails() {
        let (_temp, config) = setup(1.0);
        let mut output = Vec::new();
        let err = run(&mut output, &show_args("nope", false), &config).unwrap_err();
        assert!(err.to_string().contains("plan not found"));
    }

    #[test]
    fn describes_days_remaining() {
        assert_eq!(describe_days_remaining(0), "due today");
        assert_eq!(describe_days_remaining(1), "1 day left");
        assert_eq!(describe_days_remaining(12), "12 days left");
        assert_eq!(describe_days_remaining(-1), "1 day overdue");
        assert_eq!(describe_days_remaining(-3), "3 days overdue");
    }
}
