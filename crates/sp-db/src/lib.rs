//! Storage layer for the study planner.
//!
//! Persists plans, their topics and generated schedule items using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Date Format
//!
//! Study dates and deadlines are stored as TEXT civil dates (`2025-03-03`);
//! creation and completion times as ISO 8601 UTC timestamps
//! (`2025-03-03T10:30:00Z`). Both order lexicographically.
//!
//! ## Cascades
//!
//! Deleting a plan removes its topics and schedule items. Deleting a topic
//! removes its schedule items.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use sp_core::{Hours, TrackedItem};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored date or timestamp could not be parsed.
    #[error("invalid {column} for {row_id}: {value}")]
    DateParse {
        row_id: String,
        column: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Stored subtopics were not a JSON string array.
    #[error("invalid subtopics for topic {topic_id}: {source}")]
    Subtopics {
        topic_id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A stored study plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRecord {
    pub id: String,
    pub title: String,
    pub original_filename: Option<String>,
    pub original_content: Option<String>,
    pub deadline: NaiveDate,
    pub daily_hours: f64,
    /// Comma-separated Sunday-based weekday indexes, e.g. `1,3,5`.
    pub study_days: String,
    /// Compression applied when the plan was scheduled, in `(0, 1]`.
    pub scale_factor: f64,
    pub created_at: DateTime<Utc>,
}

/// A stored topic belonging to a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicRecord {
    pub id: String,
    pub plan_id: String,
    pub topic_name: String,
    pub subtopics: Vec<String>,
    pub estimated_hours: f64,
    pub complexity: Option<u8>,
    /// 1-based position in the plan.
    pub sequence_order: i64,
}

/// A schedule entry ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScheduleItem {
    pub topic_id: String,
    pub study_date: NaiveDate,
    pub duration_hours: f64,
}

/// A stored schedule entry, joined with its topic.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleItemRecord {
    pub id: i64,
    pub plan_id: String,
    pub topic_id: String,
    pub topic_name: String,
    pub complexity: Option<u8>,
    pub study_date: NaiveDate,
    pub duration_hours: f64,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TrackedItem for ScheduleItemRecord {
    fn is_completed(&self) -> bool {
        self.is_completed
    }

    fn duration_hours(&self) -> Hours {
        Hours::saturating(self.duration_hours)
    }
}

/// A plan with its schedule completion counts.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanListing {
    pub plan: PlanRecord,
    pub total_items: usize,
    pub completed_items: usize,
}

impl PlanListing {
    /// A plan counts as completed once it has items and all are done.
    pub const fn completed(&self) -> bool {
        self.total_items > 0 && self.completed_items == self.total_items
    }
}

/// A plan with all of its topics and schedule items.
#[derive(Debug, Clone, PartialEq)]
pub struct FullPlan {
    pub plan: PlanRecord,
    pub topics: Vec<TopicRecord>,
    pub items: Vec<ScheduleItemRecord>,
}

impl FullPlan {
    /// Sum of the topics' raw estimates, before any compression.
    pub fn total_estimated_hours(&self) -> f64 {
        self.topics.iter().map(|t| t.estimated_hours).sum()
    }
}

const PLAN_COLUMNS: &str = "id, title, original_filename, original_content, deadline, daily_hours, study_days, scale_factor, created_at";

const SCHEDULE_SELECT: &str = "
    SELECT s.id, s.plan_id, s.topic_id, t.topic_name, t.complexity, s.study_date,
           s.duration_hours, s.is_completed, s.completed_at
    FROM schedule_items s
    JOIN topics t ON s.topic_id = t.id
";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS plans (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                original_filename TEXT,
                original_content TEXT,
                deadline TEXT NOT NULL,
                daily_hours REAL NOT NULL,
                study_days TEXT NOT NULL,
                scale_factor REAL NOT NULL DEFAULT 1.0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_plans_created ON plans(created_at);

            -- subtopics: JSON array of strings
            -- sequence_order: 1-based position, defines scheduling order
            CREATE TABLE IF NOT EXISTS topics (
                id TEXT PRIMARY KEY,
                plan_id TEXT NOT NULL,
                topic_name TEXT NOT NULL,
                subtopics TEXT NOT NULL DEFAULT '[]',
                estimated_hours REAL NOT NULL,
                complexity INTEGER,
                sequence_order INTEGER NOT NULL,
                FOREIGN KEY (plan_id) REFERENCES plans(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_topics_plan ON topics(plan_id);

            -- study_date: civil date (e.g., '2025-03-03')
            -- completed_at: ISO 8601 UTC, NULL while incomplete
            CREATE TABLE IF NOT EXISTS schedule_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                plan_id TEXT NOT NULL,
                topic_id TEXT NOT NULL,
                study_date TEXT NOT NULL,
                duration_hours REAL NOT NULL,
                is_completed INTEGER NOT NULL DEFAULT 0,
                completed_at TEXT,
                FOREIGN KEY (plan_id) REFERENCES plans(id) ON DELETE CASCADE,
                FOREIGN KEY (topic_id) REFERENCES topics(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_schedule_plan_date ON schedule_items(plan_id, study_date);
            ",
        )?;
        Ok(())
    }

    /// Stores a plan with its topics and schedule in one transaction.
    pub fn insert_plan(
        &mut self,
        plan: &PlanRecord,
        topics: &[TopicRecord],
        items: &[NewScheduleItem],
    ) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            &format!("INSERT INTO plans ({PLAN_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            params![
                plan.id,
                plan.title,
                plan.original_filename,
                plan.original_content,
                format_date(plan.deadline),
                plan.daily_hours,
                plan.study_days,
                plan.scale_factor,
                format_timestamp(plan.created_at),
            ],
        )?;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO topics
                (id, plan_id, topic_name, subtopics, estimated_hours, complexity, sequence_order)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ",
            )?;
            for topic in topics {
                let subtopics =
                    serde_json::to_string(&topic.subtopics).map_err(|source| DbError::Subtopics {
                        topic_id: topic.id.clone(),
                        source,
                    })?;
                stmt.execute(params![
                    topic.id,
                    topic.plan_id,
                    topic.topic_name,
                    subtopics,
                    topic.estimated_hours,
                    topic.complexity,
                    topic.sequence_order,
                ])?;
            }
        }
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO schedule_items (plan_id, topic_id, study_date, duration_hours)
                VALUES (?, ?, ?, ?)
                ",
            )?;
            for item in items {
                stmt.execute(params![
                    plan.id,
                    item.topic_id,
                    format_date(item.study_date),
                    item.duration_hours,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(
            plan_id = %plan.id,
            topics = topics.len(),
            items = items.len(),
            "stored plan"
        );
        Ok(())
    }

    /// Lists plans, newest first, with completion counts.
    pub fn list_plans(&self) -> Result<Vec<PlanListing>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT p.id, p.title, p.original_filename, p.original_content, p.deadline,
                   p.daily_hours, p.study_days, p.scale_factor, p.created_at,
                   COUNT(s.id), COALESCE(SUM(s.is_completed), 0)
            FROM plans p
            LEFT JOIN schedule_items s ON s.plan_id = p.id
            GROUP BY p.id
            ORDER BY p.created_at DESC, p.id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            let raw = RawPlan::from_row(row)?;
            let total: i64 = row.get(9)?;
            let completed: i64 = row.get(10)?;
            Ok((raw, total, completed))
        })?;
        let mut plans = Vec::new();
        for row in rows {
            let (raw, total, completed) = row?;
            plans.push(PlanListing {
                plan: raw.into_record()?,
                total_items: usize::try_from(total).unwrap_or(0),
                completed_items: usize::try_from(completed).unwrap_or(0),
            });
        }
        Ok(plans)
    }

    /// Fetches a single plan row.
    pub fn get_plan_record(&self, plan_id: &str) -> Result<Option<PlanRecord>, DbError> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = ?"),
                [plan_id],
                RawPlan::from_row,
            )
            .optional()?;
        raw.map(RawPlan::into_record).transpose()
    }

    /// Fetches a plan with its topics and schedule.
    pub fn get_plan(&self, plan_id: &str) -> Result<Option<FullPlan>, DbError> {
        let Some(plan) = self.get_plan_record(plan_id)? else {
            return Ok(None);
        };
        let topics = self.list_topics(plan_id)?;
        let items = self.list_schedule_items(plan_id)?;
        Ok(Some(FullPlan {
            plan,
            topics,
            items,
        }))
    }

    /// Lists a plan's topics in sequence order.
    pub fn list_topics(&self, plan_id: &str) -> Result<Vec<TopicRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, plan_id, topic_name, subtopics, estimated_hours, complexity, sequence_order
            FROM topics
            WHERE plan_id = ?
            ORDER BY sequence_order ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([plan_id], |row| {
            let subtopics: String = row.get(3)?;
            Ok((
                TopicRecord {
                    id: row.get(0)?,
                    plan_id: row.get(1)?,
                    topic_name: row.get(2)?,
                    subtopics: Vec::new(),
                    estimated_hours: row.get(4)?,
                    complexity: row.get(5)?,
                    sequence_order: row.get(6)?,
                },
                subtopics,
            ))
        })?;
        let mut topics = Vec::new();
        for row in rows {
            let (mut topic, subtopics) = row?;
            topic.subtopics =
                serde_json::from_str(&subtopics).map_err(|source| DbError::Subtopics {
                    topic_id: topic.id.clone(),
                    source,
                })?;
            topics.push(topic);
        }
        Ok(topics)
    }

    /// Lists a plan's schedule items by date, then insertion order.
    pub fn list_schedule_items(&self, plan_id: &str) -> Result<Vec<ScheduleItemRecord>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "{SCHEDULE_SELECT} WHERE s.plan_id = ? ORDER BY s.study_date ASC, s.id ASC"
        ))?;
        let rows = stmt.query_map([plan_id], RawScheduleItem::from_row)?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row?.into_record()?);
        }
        Ok(items)
    }

    /// Fetches a single schedule item.
    pub fn get_schedule_item(&self, item_id: i64) -> Result<Option<ScheduleItemRecord>, DbError> {
        let raw = self
            .conn
            .query_row(
                &format!("{SCHEDULE_SELECT} WHERE s.id = ?"),
                [item_id],
                RawScheduleItem::from_row,
            )
            .optional()?;
        raw.map(RawScheduleItem::into_record).transpose()
    }

    /// Marks a schedule item complete (stamping `now`) or incomplete.
    ///
    /// Returns the updated item, or `None` if it does not exist.
    pub fn set_schedule_item_completed(
        &mut self,
        item_id: i64,
        completed: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<ScheduleItemRecord>, DbError> {
        let completed_at = completed.then(|| format_timestamp(now));
        let updated = self.conn.execute(
            "UPDATE schedule_items SET is_completed = ?, completed_at = ? WHERE id = ?",
            params![completed, completed_at, item_id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        tracing::debug!(item_id, completed, "updated schedule item");
        self.get_schedule_item(item_id)
    }

    /// Deletes a plan and everything attached to it.
    ///
    /// Returns whether a plan was removed.
    pub fn delete_plan(&mut self, plan_id: &str) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM plans WHERE id = ?", [plan_id])?;
        Ok(deleted > 0)
    }

    /// Counts stored plans.
    pub fn count_plans(&self) -> Result<usize, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM plans", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

/// Plan row before date parsing.
struct RawPlan {
    id: String,
    title: String,
    original_filename: Option<String>,
    original_content: Option<String>,
    deadline: String,
    daily_hours: f64,
    study_days: String,
    scale_factor: f64,
    created_at: String,
}

impl RawPlan {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            original_filename: row.get(2)?,
            original_content: row.get(3)?,
            deadline: row.get(4)?,
            daily_hours: row.get(5)?,
            study_days: row.get(6)?,
            scale_factor: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn into_record(self) -> Result<PlanRecord, DbError> {
        let deadline = parse_date(&self.deadline, &self.id, "deadline")?;
        let created_at = parse_timestamp(&self.created_at, &self.id, "created_at")?;
        Ok(PlanRecord {
            id: self.id,
            title: self.title,
            original_filename: self.original_filename,
            original_content: self.original_content,
            deadline,
            daily_hours: self.daily_hours,
            study_days: self.study_days,
            scale_factor: self.scale_factor,
            created_at,
        })
    }
}

/// Schedule row before date parsing.
struct RawScheduleItem {
    id: i64,
    plan_id: String,
    topic_id: String,
    topic_name: String,
    complexity: Option<u8>,
    study_date: String,
    duration_hours: f64,
    is_completed: bool,
    completed_at: Option<String>,
}

impl RawScheduleItem {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            plan_id: row.get(1)?,
            topic_id: row.get(2)?,
            topic_name: row.get(3)?,
            complexity: row.get(4)?,
            study_date: row.get(5)?,
            duration_hours: row.get(6)?,
            is_completed: row.get(7)?,
            completed_at: row.get(8)?,
        })
    }

    fn into_record(self) -> Result<ScheduleItemRecord, DbError> {
        let row_id = self.id.to_string();
        let study_date = parse_date(&self.study_date, &row_id, "study_date")?;
        let completed_at = self
            .completed_at
            .as_deref()
            .map(|value| parse_timestamp(value, &row_id, "completed_at"))
            .transpose()?;
        Ok(ScheduleItemRecord {
            id: self.id,
            plan_id: self.plan_id,
            topic_id: self.topic_id,
            topic_name: self.topic_name,
            complexity: self.complexity,
            study_date,
            duration_hours: self.duration_hours,
            is_completed: self.is_completed,
            completed_at,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_date(value: &str, row_id: &str, column: &'static str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| DbError::DateParse {
        row_id: row_id.to_string(),
        column,
        value: value.to_string(),
        source,
    })
}

fn parse_timestamp(
    value: &str,
    row_id: &str,
    column: &'static str,
) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| DbError::DateParse {
            row_id: row_id.to_string(),
            column,
            value: value.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sp_core::PlanProgress;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, hour, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn plan(id: &str, created_at: DateTime<Utc>) -> PlanRecord {
        PlanRecord {
            id: id.to_string(),
            title: format!("Plan {id}"),
            original_filename: Some("syllabus.txt".to_string()),
            original_content: Some("Calculus I".to_string()),
            deadline: date(2025, 3, 14),
            daily_hours: 2.0,
            study_days: "1,2,3,4,5".to_string(),
            scale_factor: 1.0,
            created_at,
        }
    }

    fn topic(plan_id: &str, id: &str, order: i64) -> TopicRecord {
        TopicRecord {
            id: id.to_string(),
            plan_id: plan_id.to_string(),
            topic_name: format!("Topic {id}"),
            subtopics: vec!["intro".to_string(), "practice".to_string()],
            estimated_hours: 3.0,
            complexity: Some(2),
            sequence_order: order,
        }
    }

    fn item(topic_id: &str, day: u32, hours: f64) -> NewScheduleItem {
        NewScheduleItem {
            topic_id: topic_id.to_string(),
            study_date: date(2025, 3, day),
            duration_hours: hours,
        }
    }

    fn seeded() -> Database {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.insert_plan(
            &plan("p1", ts(9)),
            &[topic("p1", "t1", 1), topic("p1", "t2", 2)],
            &[item("t1", 3, 2.0), item("t1", 4, 1.0), item("t2", 4, 1.0), item("t2", 5, 2.0)],
        )
        .expect("insert plan");
        db
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        assert_eq!(
            table_columns(&db.conn, "plans"),
            vec![
                "id",
                "title",
                "original_filename",
                "original_content",
                "deadline",
                "daily_hours",
                "study_days",
                "scale_factor",
                "created_at",
            ]
        );
        assert_eq!(
            table_columns(&db.conn, "topics"),
            vec![
                "id",
                "plan_id",
                "topic_name",
                "subtopics",
                "estimated_hours",
                "complexity",
                "sequence_order",
            ]
        );
        assert_eq!(
            table_columns(&db.conn, "schedule_items"),
            vec![
                "id",
                "plan_id",
                "topic_id",
                "study_date",
                "duration_hours",
                "is_completed",
                "completed_at",
            ]
        );
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    #[test]
    fn init_is_idempotent() {
        let db = seeded();
        db.init().expect("second init");
        assert_eq!(db.count_plans().unwrap(), 1);
    }

    #[test]
    fn get_plan_returns_topics_and_ordered_schedule() {
        let db = seeded();
        let full = db.get_plan("p1").unwrap().expect("plan exists");

        assert_eq!(full.plan, plan("p1", ts(9)));
        assert_eq!(full.topics.len(), 2);
        assert_eq!(full.topics[0].id, "t1");
        assert_eq!(full.topics[0].subtopics, vec!["intro", "practice"]);
        assert_eq!(full.total_estimated_hours(), 6.0);

        let rows: Vec<(&str, NaiveDate, f64)> = full
            .items
            .iter()
            .map(|i| (i.topic_id.as_str(), i.study_date, i.duration_hours))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("t1", date(2025, 3, 3), 2.0),
                ("t1", date(2025, 3, 4), 1.0),
                ("t2", date(2025, 3, 4), 1.0),
                ("t2", date(2025, 3, 5), 2.0),
            ]
        );
        assert_eq!(full.items[0].topic_name, "Topic t1");
        assert_eq!(full.items[0].complexity, Some(2));
        assert!(full.items.iter().all(|i| !i.is_completed));
    }

    #[test]
    fn missing_plan_is_none() {
        let db = seeded();
        assert!(db.get_plan("nope").unwrap().is_none());
        assert!(db.get_schedule_item(999).unwrap().is_none());
    }

    #[test]
    fn insert_plan_rolls_back_on_failure() {
        let mut db = seeded();
        // Duplicate topic ID violates the primary key after the plan row is written.
        let result = db.insert_plan(
            &plan("p2", ts(10)),
            &[topic("p2", "t1", 1)],
            &[item("t1", 3, 1.0)],
        );
        assert!(result.is_err());
        assert!(db.get_plan("p2").unwrap().is_none());
        assert_eq!(db.count_plans().unwrap(), 1);
    }

    #[test]
    fn completion_toggles_and_stamps_time() {
        let mut db = seeded();
        let first = db.list_schedule_items("p1").unwrap()[0].id;

        let done = db
            .set_schedule_item_completed(first, true, ts(12))
            .unwrap()
            .expect("item exists");
        assert!(done.is_completed);
        assert_eq!(done.completed_at, Some(ts(12)));

        let undone = db
            .set_schedule_item_completed(first, false, ts(13))
            .unwrap()
            .expect("item exists");
        assert!(!undone.is_completed);
        assert_eq!(undone.completed_at, None);

        assert!(
            db.set_schedule_item_completed(999, true, ts(12))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn list_plans_reports_completion() {
        let mut db = seeded();
        db.insert_plan(&plan("p2", ts(10)), &[], &[]).unwrap();

        let listings = db.list_plans().unwrap();
        assert_eq!(listings.len(), 2);
        // Newest first.
        assert_eq!(listings[0].plan.id, "p2");
        assert_eq!(listings[0].total_items, 0);
        assert!(!listings[0].completed());

        let ids: Vec<i64> = db.list_schedule_items("p1").unwrap().iter().map(|i| i.id).collect();
        for id in &ids {
            db.set_schedule_item_completed(*id, true, ts(12)).unwrap();
        }
        let listings = db.list_plans().unwrap();
        assert_eq!(listings[1].plan.id, "p1");
        assert_eq!(listings[1].total_items, 4);
        assert_eq!(listings[1].completed_items, 4);
        assert!(listings[1].completed());
    }

    #[test]
    fn schedule_items_feed_progress() {
        let mut db = seeded();
        let first = db.list_schedule_items("p1").unwrap()[0].id;
        db.set_schedule_item_completed(first, true, ts(12)).unwrap();

        let items = db.list_schedule_items("p1").unwrap();
        let progress = PlanProgress::from_items(&items);
        assert_eq!(progress.completed_items, 1);
        assert_eq!(progress.percent(), 25);
        assert_eq!(progress.completed_hours.get(), 2.0);
        assert_eq!(progress.total_hours.get(), 6.0);
    }

    #[test]
    fn delete_plan_cascades() {
        let mut db = seeded();
        assert!(db.delete_plan("p1").unwrap());
        assert!(!db.delete_plan("p1").unwrap());

        let topics: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM topics", [], |row| row.get(0))
            .unwrap();
        let items: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM schedule_items", [], |row| row.get(0))
            .unwrap();
        assert_eq!(topics, 0);
        assert_eq!(items, 0);
    }

    #[test]
    fn corrupt_date_is_reported() {
        let db = seeded();
        db.conn
            .execute("UPDATE plans SET deadline = 'soon' WHERE id = 'p1'", [])
            .unwrap();
        let err = db.get_plan("p1").unwrap_err();
        assert!(matches!(err, DbError::DateParse { column: "deadline", .. }));
    }

    #[test]
    fn plans_survive_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("sp.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.insert_plan(&plan("p1", ts(9)), &[topic("p1", "t1", 1)], &[item("t1", 3, 3.0)])
                .unwrap();
        }
        let db = Database::open(&path).unwrap();
        let full = db.get_plan("p1").unwrap().expect("plan persisted");
        assert_eq!(full.items.len(), 1);
    }
}
