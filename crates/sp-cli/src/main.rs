use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sp_cli::commands::{complete, create, delete, list, schedule, show, status};
use sp_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init so tests that already installed a subscriber don't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = io::stdout().lock();
    match command {
        Commands::Schedule(args) => schedule::run(&mut stdout, args, &config)?,
        Commands::Create(args) => create::run(&mut stdout, args, &config)?,
        Commands::List(args) => list::run(&mut stdout, args, &config)?,
        Commands::Show(args) => show::run(&mut stdout, args, &config)?,
        Commands::Done(args) => complete::run(&mut stdout, args, true, &config)?,
        Commands::Undo(args) => complete::run(&mut stdout, args, false, &config)?,
        Commands::Delete(args) => delete::run(&mut stdout, args, &config)?,
        Commands::Status => status::run(&mut stdout, &config)?,
    }

    Ok(())
}
