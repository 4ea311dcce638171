//! CLI subcommand implementations.

pub mod complete;
pub mod create;
pub mod delete;
pub mod list;
pub mod schedule;
pub mod show;
pub mod status;
pub mod util;
