//! Delete command for plans.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use super::util::{find_plan, open_database};
use crate::Config;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Plan ID (or unique prefix).
    pub plan_id: String,
}

pub fn run<W: Write>(writer: &mut W, args: &DeleteArgs, config: &Config) -> Result<()> {
    let mut db = open_database(config)?;
    let plan = find_plan(&db, &args.plan_id)?;
    if !db.delete_plan(&plan.id)? {
        bail!("plan not found: {}", plan.id);
    }
    tracing::debug!(plan_id = %plan.id, "deleted plan");
    writeln!(writer, "Deleted plan {} ({})", plan.title, plan.id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use sp_db::{Database, PlanRecord};

    fn plan(id: &str) -> PlanRecord {
        PlanRecord {
            id: id.to_string(),
            title: "Calculus".to_string(),
            original_filename: None,
            original_content: None,
            deadline: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            daily_hours: 2.0,
            study_days: "1,2,3,4,5".to_string(),
            scale_factor: 1.0,
            created_at: "2025-03-01T09:00:00Z".parse().unwrap(),
        }
    }

    fn setup(ids: &[&str]) -> (tempfile::TempDir, Config) {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("sp.db"),
            ..Config::default()
        };
        let mut db = Database::open(&config.database_path).unwrap();
        for id in ids {
            db.insert_plan(&plan(id), &[], &[]).unwrap();
        }
        (temp, config)
    }

    #[test]
    fn delete_by_prefix() {
        let (_temp, config) = setup(&["abc123", "def456"]);
        let mut output = Vec::new();
        run(&mut output, &DeleteArgs { plan_id: "abc".to_string() }, &config).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "Deleted plan Calculus (abc123)\n");
        let db = Database::open(&config.database_path).unwrap();
        assert_eq!(db.count_plans().unwrap(), 1);
        assert!(db.get_plan_record("def456").unwrap().is_some());
    }

    #[test]
    fn ambiguous_prefix_deletes_nothing() {
        let (_temp, config) = setup(&["abc123", "abc456"]);
        let mut output = Vec::new();
        let err = run(&mut output, &DeleteArgs { plan_id: "abc".to_string() }, &config)
            .unwrap_err();

        assert!(err.to_string().contains("ambiguous"));
        let db = Database::open(&config.database_path).unwrap();
        assert_eq!(db.count_plans().unwrap(), 2);
    }
}
