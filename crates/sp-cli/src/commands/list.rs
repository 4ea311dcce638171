//! List command for stored plans.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use sp_db::PlanListing;

use super::util::{open_database, progress_bar, short_id};
use crate::Config;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PlanSummary<'a> {
    id: &'a str,
    title: &'a str,
    deadline: NaiveDate,
    created_at: DateTime<Utc>,
    total_items: usize,
    completed_items: usize,
    percent: u8,
    completed: bool,
}

impl<'a> From<&'a PlanListing> for PlanSummary<'a> {
    fn from(listing: &'a PlanListing) -> Self {
        Self {
            id: &listing.plan.id,
            title: &listing.plan.title,
            deadline: listing.plan.deadline,
            created_at: listing.plan.created_at,
            total_items: listing.total_items,
            completed_items: listing.completed_items,
            percent: percent(listing),
            completed: listing.completed(),
        }
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percent(listing: &PlanListing) -> u8 {
    if listing.total_items == 0 {
        return 0;
    }
    let ratio = listing.completed_items as f64 / listing.total_items as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn run<W: Write>(writer: &mut W, args: &ListArgs, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let listings = db.list_plans()?;

    if args.json {
        let summaries: Vec<PlanSummary<'_>> = listings.iter().map(PlanSummary::from).collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&summaries)?)?;
        return Ok(());
    }

    write_listings(writer, &listings)
}

fn write_listings<W: Write>(writer: &mut W, listings: &[PlanListing]) -> Result<()> {
    if listings.is_empty() {
        writeln!(writer, "No plans yet.")?;
        writeln!(writer)?;
        writeln!(
            writer,
            "Hint: Run 'sp create --title <title> --topics <file> --deadline <date>' to make one."
        )?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<8}  {:<24}  {:<10}  Progress",
        "ID", "Title", "Deadline"
    )?;
    writeln!(
        writer,
        "────────  ────────────────────────  ──────────  ──────────────────────"
    )?;
    for listing in listings {
        let pct = percent(listing);
        let mark = if listing.completed() { "  ✓" } else { "" };
        writeln!(
            writer,
            "{:<8}  {:<24}  {}  {} {:>3}% ({}/{}){}",
            short_id(&listing.plan.id),
            truncate(&listing.plan.title, 24),
            listing.plan.deadline,
            progress_bar(pct),
            pct,
            listing.completed_items,
            listing.total_items,
            mark,
        )?;
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}
