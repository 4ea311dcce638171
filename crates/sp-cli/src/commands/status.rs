//! Status command for showing where plans are stored.

use std::io::Write;

use anyhow::Result;

use super::util::open_database;
use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let db = open_database(config)?;
    let plans = db.list_plans()?;

    writeln!(writer, "Study planner status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;

    if plans.is_empty() {
        writeln!(writer, "No plans stored.")?;
        return Ok(());
    }

    let completed = plans.iter().filter(|listing| listing.completed()).count();
    writeln!(
        writer,
        "Plans: {} ({} completed, {} in progress)",
        plans.len(),
        completed,
        plans.len() - completed
    )?;

    Ok(())
}
