//! The linear clean → normalize → score → aggregate pipeline.
use crate::core::aggregate::{self, Dashboard, TopFund};
use crate::core::clean::{self, CleaningReport};
use crate::core::error::{PipelineError, Stage};
use crate::core::export::{ExportedFiles, Exporter};
use crate::core::fund::{RankedFund, RawFund};
use crate::core::normalize;
use crate::core::scoring::{self, ScoringConfig};
use crate::core::stats::{self, DatasetDescription};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub scoring: ScoringConfig,
    pub top_n: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            top_n: 30,
        }
    }
}

/// Result of one pipeline run. `ranked` is sorted by rank.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub cleaning: CleaningReport,
    pub description: DatasetDescription,
    pub ranked: Vec<RankedFund>,
    pub top: Vec<TopFund>,
    pub dashboard: Dashboard,
}

/// Runs every stage on the raw table. `on_stage` is called as each stage starts.
pub fn run(
    raw: Vec<RawFund>,
    options: &PipelineOptions,
    on_stage: &dyn Fn(Stage),
) -> Result<PipelineOutput, PipelineError> {
    if raw.is_empty() {
        return Err(PipelineError::EmptyTable(Stage::Clean));
    }

    on_stage(Stage::Clean);
    let cleaned = clean::clean(raw);

    on_stage(Stage::Describe);
    let description = stats::describe(&cleaned.funds);
    for column in &description.columns {
        debug!(
            "{}: count {} mean {:.2} min {:.2} median {:.2} max {:.2}",
            column.name, column.count, column.mean, column.min, column.p50, column.max
        );
    }
    debug!(
        "Fund types: {}, categories: {}, AMCs: {}, fund managers: {}",
        description.fund_types, description.categories, description.amcs, description.fund_managers
    );

    on_stage(Stage::Normalize);
    let normalized = normalize::normalize(cleaned.funds)?;

    on_stage(Stage::Score);
    let ranked = scoring::score_and_rank(normalized, &options.scoring)?;

    on_stage(Stage::Aggregate);
    let top = aggregate::top_funds(&ranked, options.top_n);
    let dashboard = aggregate::build_dashboard(&ranked, options.top_n);
    info!("Extracted top {} of {} funds", top.len(), ranked.len());

    Ok(PipelineOutput {
        cleaning: cleaned.report,
        description,
        ranked,
        top,
        dashboard,
    })
}

/// Writes the pipeline output through `exporter`.
pub fn export(output: &PipelineOutput, exporter: &Exporter) -> Result<ExportedFiles, PipelineError> {
    exporter
        .write_all(&output.ranked, &output.top, &output.dashboard)
        .map_err(|(path, source)| PipelineError::Export { path, source })
}
