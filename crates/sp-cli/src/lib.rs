//! Study planner CLI library.
//!
//! This crate provides the CLI interface for the study planner.

mod cli;
pub mod commands;
mod config;
pub mod topics;

pub use cli::{Cli, Commands};
pub use config::Config;
