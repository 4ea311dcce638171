//! Create command: schedule a topic list and store it as a plan.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Args;
use sp_core::{Complexity, ResolvedPlan, Schedule};
use sp_db::{NewScheduleItem, PlanRecord, TopicRecord};
use sp_llm::Client;
use uuid::Uuid;

use super::schedule::{PlanningArgs, plan, write_compression_warning};
use super::util::{format_hours, open_database, short_id};
use crate::Config;
use crate::topics::{TopicEntry, load_topics};

/// Where the topic list comes from.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct TopicSource {
    /// JSON topic file.
    #[arg(long)]
    pub topics: Option<PathBuf>,

    /// Plain-text syllabus to extract topics from (requires an API key).
    #[arg(long)]
    pub syllabus: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Plan title.
    #[arg(long)]
    pub title: String,

    #[command(flatten)]
    pub source: TopicSource,

    #[command(flatten)]
    pub planning: PlanningArgs,
}

/// Topics plus the document they were read from.
struct LoadedTopics {
    entries: Vec<TopicEntry>,
    filename: Option<String>,
    content: String,
}

pub fn run<W: Write>(writer: &mut W, args: &CreateArgs, config: &Config) -> Result<()> {
    let title = args.title.trim();
    if title.is_empty() {
        bail!("plan title cannot be empty");
    }

    let loaded = match (&args.source.topics, &args.source.syllabus) {
        (Some(path), _) => {
            let (entries, content) = load_topics(path)?;
            LoadedTopics {
                entries,
                filename: file_name(path),
                content,
            }
        }
        (None, Some(path)) => extract_from_syllabus(path, config)?,
        (None, None) => bail!("either --topics or --syllabus is required"),
    };

    let topic_ids: Vec<String> = loaded
        .entries
        .iter()
        .map(|_| Uuid::new_v4().to_string())
        .collect();
    let raw_topics = loaded
        .entries
        .iter()
        .zip(&topic_ids)
        .map(|(entry, id)| entry.to_raw_topic(id.clone()))
        .collect();

    let (request, today) = args.planning.to_request(raw_topics, config)?;
    let (resolved, schedule) = plan(&request, today)?;

    let plan_record = PlanRecord {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        original_filename: loaded.filename,
        original_content: Some(loaded.content),
        deadline: resolved.constraints.deadline,
        daily_hours: resolved.constraints.daily_hours_budget.get(),
        study_days: resolved.constraints.allowed_weekdays.to_string(),
        scale_factor: schedule.scale_factor(),
        created_at: Utc::now(),
    };
    let topics = topic_records(&plan_record.id, &loaded.entries, &resolved);
    let items = schedule_items(&schedule);

    let mut db = open_database(config)?;
    db.insert_plan(&plan_record, &topics, &items)
        .context("failed to store plan")?;
    tracing::debug!(plan_id = %plan_record.id, items = items.len(), "created plan");

    write_summary(writer, &plan_record, &resolved, &schedule)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

/// Extensions read as plain-text syllabi. Anything else (PDF, DOCX, ...) is refused.
const SYLLABUS_EXTENSIONS: &[&str] = &["txt", "text", "md", "markdown"];

fn check_syllabus_format(path: &Path) -> Result<()> {
    let Some(extension) = path.extension() else {
        return Ok(());
    };
    let extension = extension.to_string_lossy().to_ascii_lowercase();
    if !SYLLABUS_EXTENSIONS.contains(&extension.as_str()) {
        bail!(
            "unsupported syllabus format: .{extension} (convert {} to plain text first)",
            path.display()
        );
    }
    Ok(())
}

fn extract_from_syllabus(path: &Path, config: &Config) -> Result<LoadedTopics> {
    check_syllabus_format(path)?;

    let api_key = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow::anyhow!("missing Claude API key (set SP_API_KEY or config.toml)"))?;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let client = Client::new(api_key.to_string()).context("failed to create LLM client")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let extracted = runtime
        .block_on(client.extract_topics(&config.model, &content))
        .context("failed to extract topics from syllabus")?;
    tracing::debug!(topics = extracted.len(), model = %config.model, "extracted topics");

    Ok(LoadedTopics {
        entries: extracted.into_iter().map(TopicEntry::from).collect(),
        filename: file_name(path),
        content,
    })
}

/// Topic rows in input order, carrying the resolved (coerced) estimates.
fn topic_records(plan_id: &str, entries: &[TopicEntry], resolved: &ResolvedPlan) -> Vec<TopicRecord> {
    entries
        .iter()
        .zip(&resolved.topics)
        .zip(1..)
        .map(|((entry, topic), sequence_order)| TopicRecord {
            id: topic.id.as_str().to_string(),
            plan_id: plan_id.to_string(),
            topic_name: entry.topic_name.clone(),
            subtopics: entry.subtopics.clone(),
            estimated_hours: topic.estimated_hours.get(),
            complexity: topic.complexity.map(Complexity::get),
            sequence_order,
        })
        .collect()
}

fn schedule_items(schedule: &Schedule) -> Vec<NewScheduleItem> {
    schedule
        .entries
        .iter()
        .map(|entry| NewScheduleItem {
            topic_id: entry.topic_id.as_str().to_string(),
            study_date: entry.date,
            duration_hours: entry.duration_hours.get(),
        })
        .collect()
}

fn write_summary<W: Write>(
    writer: &mut W,
    plan: &PlanRecord,
    resolved: &ResolvedPlan,
    schedule: &Schedule,
) -> Result<()> {
    let mut sessions_per_topic: HashMap<&str, usize> = HashMap::new();
    for entry in &schedule.entries {
        *sessions_per_topic.entry(entry.topic_id.as_str()).or_insert(0) += 1;
    }

    writeln!(writer, "Created plan {} ({})", plan.title, short_id(&plan.id))?;
    writeln!(writer, "ID: {}", plan.id)?;
    writeln!(
        writer,
        "{} topics, {} across {} sessions until {}",
        resolved.topics.len(),
        format_hours(resolved.total_hours().get()),
        schedule.entries.len(),
        plan.deadline,
    )?;
    for topic in &resolved.topics {
        let sessions = sessions_per_topic
            .get(topic.id.as_str())
            .copied()
            .unwrap_or(0);
        writeln!(
            writer,
            "- {} ({}, {} {})",
            topic.name.as_deref().unwrap_or_default(),
            format_hours(topic.estimated_hours.get()),
            sessions,
            if sessions == 1 { "session" } else { "sessions" },
        )?;
    }
    if schedule.is_compressed() {
        write_compression_warning(writer, schedule)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use sp_db::Database;

    fn setup() -> (tempfile::TempDir, Config) {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("data").join("sp.db"),
            ..Config::default()
        };
        (temp, config)
    }

    fn create_args(topics: PathBuf, deadline: &str) -> CreateArgs {
        CreateArgs {
            title: "Calculus".to_string(),
            source: TopicSource {
                topics: Some(topics),
                syllabus: None,
            },
            planning: PlanningArgs {
                deadline: deadline.to_string(),
                daily_hours: Some("2".to_string()),
                study_days: Some("1,3,5".to_string()),
                today: NaiveDate::from_ymd_opt(2025, 3, 3),
            },
        }
    }

    #[test]
    fn create_stores_plan_topics_and_schedule() {
        let (temp, config) = setup();
        let topics_path = temp.path().join("calc.json");
        std::fs::write(
            &topics_path,
            r#"{"topics": [
                {"topic_name": "Limits", "subtopics": ["One-sided"], "estimated_hours": 3, "complexity": 2},
                {"topic_name": "Derivatives", "estimated_hours": "2"}
            ]}"#,
        )
        .unwrap();

        let mut output = Vec::new();
        run(&mut output, &create_args(topics_path, "2025-03-08"), &config).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Created plan Calculus ("), "{output}");
        assert!(output.contains("2 topics, 5h across 4 sessions until 2025-03-08"));
        assert!(output.contains("- Limits (3h, 2 sessions)"));
        assert!(!output.contains("Warning"));

        let db = Database::open(&config.database_path).unwrap();
        let listings = db.list_plans().unwrap();
        assert_eq!(listings.len(), 1);
        let plan = db.get_plan(&listings[0].plan.id).unwrap().unwrap();

        assert_eq!(plan.plan.title, "Calculus");
        assert_eq!(plan.plan.original_filename.as_deref(), Some("calc.json"));
        assert!(plan.plan.original_content.unwrap().contains("Limits"));
        assert_eq!(plan.plan.study_days, "1,3,5");
        assert_eq!(plan.plan.daily_hours, 2.0);
        assert_eq!(plan.plan.scale_factor, 1.0);

        assert_eq!(plan.topics.len(), 2);
        assert_eq!(plan.topics[0].topic_name, "Limits");
        assert_eq!(plan.topics[0].subtopics, vec!["One-sided".to_string()]);
        assert_eq!(plan.topics[0].complexity, Some(2));
        assert_eq!(plan.topics[0].sequence_order, 1);
        assert_eq!(plan.topics[1].estimated_hours, 2.0);
        assert_eq!(plan.topics[1].complexity, None);

        let dates: Vec<String> = plan
            .items
            .iter()
            .map(|item| format!("{} {} {}", item.study_date, item.topic_name, item.duration_hours))
            .collect();
        assert_eq!(
            dates,
            vec![
                "2025-03-03 Limits 2",
                "2025-03-05 Limits 1",
                "2025-03-05 Derivatives 1",
                "2025-03-07 Derivatives 1",
            ]
        );
    }

    #[test]
    fn create_records_scale_factor_when_compressed() {
        let (temp, config) = setup();
        let topics_path = temp.path().join("topics.json");
        std::fs::write(&topics_path, r#"[{"topic_name": "Everything", "estimated_hours": 12}]"#)
            .unwrap();

        let mut output = Vec::new();
        run(&mut output, &create_args(topics_path, "2025-03-08"), &config).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("scaled to 50% of its estimate"), "{output}");

        let db = Database::open(&config.database_path).unwrap();
        let plan = &db.list_plans().unwrap()[0].plan;
        assert_eq!(plan.scale_factor, 0.5);
    }

    #[test]
    fn create_rejects_zero_workload_without_storing() {
        let (temp, config) = setup();
        let topics_path = temp.path().join("topics.json");
        std::fs::write(&topics_path, r#"[{"topic_name": "Nothing", "estimated_hours": 0}]"#)
            .unwrap();

        let mut output = Vec::new();
        let err = run(&mut output, &create_args(topics_path, "2025-03-08"), &config).unwrap_err();
        assert!(format!("{err:#}").contains("total estimated hours is zero"));
        assert!(!config.database_path.exists());
    }

    #[test]
    fn syllabus_requires_api_key() {
        let (temp, config) = setup();
        let syllabus = temp.path().join("syllabus.txt");
        std::fs::write(&syllabus, "Week 1: Limits").unwrap();
        let mut args = create_args(PathBuf::new(), "2025-03-08");
        args.source = TopicSource {
            topics: None,
            syllabus: Some(syllabus),
        };

        let mut output = Vec::new();
        let err = run(&mut output, &args, &config).unwrap_err();
        assert!(err.to_string().contains("missing Claude API key"));
    }

    #[test]
    fn syllabus_rejects_binary_documents() {
        let (temp, config) = setup();
        let config = Config {
            api_key: Some("sk-test".to_string()),
            ..config
        };
        let syllabus = temp.path().join("syllabus.pdf");
        std::fs::write(&syllabus, b"%PDF-1.7").unwrap();
        let mut args = create_args(PathBuf::new(), "2025-03-08");
        args.source = TopicSource {
            topics: None,
            syllabus: Some(syllabus),
        };

        let mut output = Vec::new();
        let err = run(&mut output, &args, &config).unwrap_err();
        assert!(err.to_string().contains("unsupported syllabus format: .pdf"), "{err}");
        assert!(!config.database_path.exists());
    }

    #[test]
    fn syllabus_format_allows_plain_text() {
        assert!(check_syllabus_format(Path::new("week1.txt")).is_ok());
        assert!(check_syllabus_format(Path::new("NOTES.MD")).is_ok());
        assert!(check_syllabus_format(Path::new("syllabus")).is_ok());
        assert!(check_syllabus_format(Path::new("syllabus.docx")).is_err());
    }
}
