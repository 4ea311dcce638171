//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, bail};
use chrono::{Duration, Local, NaiveDate};
use regex::Regex;
use sp_db::{Database, PlanRecord};

use crate::Config;

/// Pre-compiled regex for relative deadlines ("3 weeks", "in 10 days").
static RELATIVE_DEADLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:in\s+)?(\d+)\s*(day|week)s?$").unwrap());

/// Upper bound for relative deadlines (~10 years).
const MAX_RELATIVE_DAYS: i64 = 3650;

/// Returns the override date or the local calendar date.
pub fn today_or(override_date: Option<NaiveDate>) -> NaiveDate {
    override_date.unwrap_or_else(|| Local::now().date_naive())
}

/// Parse a deadline as an ISO date or an offset from `today`.
///
/// Supports:
/// - ISO 8601 date: "2026-01-15"
/// - Relative: "10 days", "3 weeks", "in 2 weeks"
pub fn parse_deadline(s: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let trimmed = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    let lower = trimmed.to_ascii_lowercase();
    let Some(caps) = RELATIVE_DEADLINE_RE.captures(&lower) else {
        bail!("Invalid deadline: {s}. Use an ISO date (e.g., 2026-01-15) or relative (e.g., '3 weeks')");
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative deadline")?;
    let days = match &caps[2] {
        "day" => n,
        "week" => n.saturating_mul(7),
        unit => bail!("Unknown deadline unit: {unit}"),
    };
    if days > MAX_RELATIVE_DAYS {
        bail!("Relative deadline too far away: {trimmed}");
    }

    Ok(today + Duration::days(days))
}

/// Formats fractional hours as "Xh Ym", "Xh" or "Ym", rounded to the minute.
#[allow(clippy::cast_possible_truncation)]
pub fn format_hours(hours: f64) -> String {
    if !hours.is_finite() || hours <= 0.0 {
        return "0m".to_string();
    }
    let total_minutes = (hours * 60.0).round() as i64;
    let h = total_minutes / 60;
    let m = total_minutes % 60;

    match (h, m) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Generates a 10-character progress bar for a percentage.
pub fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)).div_ceil(10);
    let filled = if percent > 0 && percent < 100 {
        filled.clamp(1, 9)
    } else {
        filled
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

/// Opens the configured database, ensuring its parent directory exists.
pub fn open_database(config: &Config) -> anyhow::Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

/// Finds a plan by full ID or unique ID prefix.
pub fn find_plan(db: &Database, id_or_prefix: &str) -> anyhow::Result<PlanRecord> {
    let needle = id_or_prefix.trim();
    if needle.is_empty() {
        bail!("plan ID cannot be empty");
    }
    if let Some(plan) = db.get_plan_record(needle)? {
        return Ok(plan);
    }

    let mut matches: Vec<PlanRecord> = db
        .list_plans()?
        .into_iter()
        .map(|listing| listing.plan)
        .filter(|plan| plan.id.starts_with(needle))
        .collect();
    match matches.len() {
        0 => bail!("plan not found: {needle}"),
        1 => Ok(matches.remove(0)),
        n => bail!("plan ID prefix {needle} is ambiguous ({n} matches)"),
    }
}

/// First eight characters of an ID, for display.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}
