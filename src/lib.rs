pub mod cli;
pub mod core;

use crate::core::config::AppConfig;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

pub enum AppCommand {
    Analyze,
    Describe,
    Top { count: usize },
}

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

pub fn load_config(config_path: Option<&str>, overrides: &Overrides) -> Result<AppConfig> {
    let mut config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    if let Some(input) = &overrides.input {
        config.input = input.clone();
    }
    if let Some(output_dir) = &overrides.output_dir {
        config.output_dir = output_dir.clone();
    }
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    overrides: &Overrides,
) -> Result<()> {
    info!("Fund ranking starting...");
    let config = load_config(config_path, overrides)?;

    match command {
        AppCommand::Analyze => cli::analyze::run(&config).map(|_| ()),
        AppCommand::Describe => cli::describe::run(&config).map(|_| ()),
        AppCommand::Top { count } => cli::top::run(&config, count).map(|_| ()),
    }
}
