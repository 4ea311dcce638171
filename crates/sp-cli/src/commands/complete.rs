//! Done/undo commands for schedule items.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::Utc;
use clap::Args;

use super::util::{format_hours, open_database};
use crate::Config;

#[derive(Debug, Args)]
pub struct CompleteArgs {
    /// Schedule item ID (as shown by `sp show`).
    pub item_id: i64,
}

/// Marks an item completed (`completed = true`) or reopens it.
pub fn run<W: Write>(
    writer: &mut W,
    args: &CompleteArgs,
    completed: bool,
    config: &Config,
) -> Result<()> {
    let mut db = open_database(config)?;
    let Some(item) = db.set_schedule_item_completed(args.item_id, completed, Utc::now())? else {
        bail!("schedule item not found: {}", args.item_id);
    };

    let verb = if completed { "Completed" } else { "Reopened" };
    writeln!(
        writer,
        "{verb} #{}: {} on {} ({})",
        item.id,
        item.topic_name,
        item.study_date,
        format_hours(item.duration_hours)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use insta::assert_snapshot;
    use sp_db::{Database, NewScheduleItem, PlanRecord, TopicRecord};

    fn setup() -> (tempfile::TempDir, Config, i64) {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("sp.db"),
            ..Config::default()
        };
        let mut db = Database::open(&config.database_path).unwrap();
        let plan = PlanRecord {
            id: "plan-1".to_string(),
            title: "Calculus".to_string(),
            original_filename: None,
            original_content: None,
            deadline: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            daily_hours: 2.0,
            study_days: "1,2,3,4,5".to_string(),
            scale_factor: 1.0,
            created_at: "2025-03-01T09:00:00Z".parse().unwrap(),
        };
        let topic = TopicRecord {
            id: "topic-1".to_string(),
            plan_id: "plan-1".to_string(),
            topic_name: "Limits".to_string(),
            subtopics: Vec::new(),
            estimated_hours: 1.5,
            complexity: Some(2),
            sequence_order: 1,
        };
        let item = NewScheduleItem {
            topic_id: "topic-1".to_string(),
            study_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            duration_hours: 1.5,
        };
        db.insert_plan(&plan, &[topic], &[item]).unwrap();
        let item_id = db.list_schedule_items("plan-1").unwrap()[0].id;
        (temp, config, item_id)
    }

    #[test]
    fn done_then_undo_toggles_completion() {
        let (_temp, config, item_id) = setup();
        let args = CompleteArgs { item_id };

        let mut output = Vec::new();
        run(&mut output, &args, true, &config).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @"Completed #1: Limits on 2025-03-03 (1h 30m)");

        let db = Database::open(&config.database_path).unwrap();
        let item = db.get_schedule_item(item_id).unwrap().unwrap();
        assert!(item.is_completed);
        assert!(item.completed_at.is_some());
        drop(db);

        let mut output = Vec::new();
        run(&mut output, &args, false, &config).unwrap();
        assert_snapshot!(String::from_utf8(output).unwrap(), @"Reopened #1: Limits on 2025-03-03 (1h 30m)");

        let db = Database::open(&config.database_path).unwrap();
        let item = db.get_schedule_item(item_id).unwrap().unwrap();
        assert!(!item.is_completed);
        assert_eq!(item.completed_at, None);
    }

    #[test]
    fn unknown_item_fails() {
        let (_temp, config, _) = setup();
        let mut output = Vec::new();
        let err = run(&mut output, &CompleteArgs { item_id: 999 }, true, &config).unwrap_err();
        assert_eq!(err.to_string(), "schedule item not found: 999");
    }
}
