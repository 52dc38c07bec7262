mod cli;
mod commands;
mod config;
mod engine;
mod paths;
mod progress;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config_path: PathBuf,
    pub state_path: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "groupctl", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config_path: paths::config_file(cli.config.as_deref())?,
        state_path: paths::state_file(cli.state.as_deref())?,
    };
    log::debug!(
        "config: {}, state: {}",
        ctx.config_path.display(),
        ctx.state_path.display()
    );

    match cli.command {
        Command::Validate => commands::plan::validate(&ctx),
        Command::Plan(args) => commands::plan::run(&ctx, &args),
        Command::Apply(args) => commands::apply::run(&ctx, &args),
        Command::Destroy(args) => commands::apply::destroy(&ctx, &args),
        Command::Import { address, name } => commands::inspect::import(&ctx, &address, &name),
        Command::Refresh => commands::inspect::refresh(&ctx),
        Command::Show { address, json } => commands::inspect::show(&ctx, address.as_deref(), json),
        Command::Completions { .. } => Ok(()),
    }
}
