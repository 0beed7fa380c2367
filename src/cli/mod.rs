//! Command front-ends

pub mod analyze;
pub mod describe;
pub mod setup;
pub mod top;
pub mod ui;

use crate::core::config::AppConfig;
use crate::core::{PipelineError, PipelineOutput, RawFund, Stage, loader, pipeline};
use anyhow::{Context, Result};

fn load_input(config: &AppConfig) -> Result<Vec<RawFund>> {
    loader::load_from_path(&config.input)
        .map_err(PipelineError::from)
        .with_context(|| format!("Failed to load {}", config.input.display()))
}

/// Loads the configured input and runs every stage behind a spinner.
fn run_pipeline(config: &AppConfig) -> Result<PipelineOutput> {
    let pb = ui::new_spinner();
    pb.set_message(format!("Running {} stage...", Stage::Load));

    let result = load_input(config).and_then(|raw| {
        pipeline::run(raw, &config.pipeline_options(), &|stage| {
            pb.set_message(format!("Running {stage} stage..."));
        })
        .context("Analysis failed")
    });

    pb.finish_and_clear();
    result
}
