use super::ui;
use crate::core::clean::CleaningReport;
use crate::core::config::AppConfig;
use crate::core::export::{ExportedFiles, Exporter};
use crate::core::pipeline;
use anyhow::{Context, Result};
use tracing::info;

/// Funds shown in the terminal after an analysis run.
const PREVIEW_COUNT: usize = 5;

/// Runs the full pipeline and writes every artifact to the output directory.
pub fn run(config: &AppConfig) -> Result<ExportedFiles> {
    info!("Analyzing {}", config.input.display());
    let output = super::run_pipeline(config)?;

    let exporter = Exporter::new(&config.output_dir);
    let files = pipeline::export(&output, &exporter).context("Failed to save outputs")?;

    println!("{}", ui::style_text("Mutual Fund Analysis", ui::StyleType::Title));
    println!("\n{}", cleaning_summary(&output.cleaning));

    let preview: Vec<_> = output.top.iter().take(PREVIEW_COUNT).cloned().collect();
    println!(
        "\nTop {} of {} funds:\n{}",
        preview.len(),
        output.ranked.len(),
        ui::ranked_table(&preview)
    );

    ui::print_separator();
    println!("{}", ui::style_text("Outputs", ui::StyleType::TotalLabel));
    for path in [
        &files.processed_csv,
        &files.top_csv,
        &files.top_xlsx,
        &files.dashboard_json,
    ] {
        println!("  {}", path.display());
    }

    Ok(files)
}

fn cleaning_summary(report: &CleaningReport) -> String {
    let filled: usize = report.filled_from_category.iter().sum::<usize>()
        + report.filled_from_global.iter().sum::<usize>();
    format!(
        "Loaded {} records, removed {} duplicates, filled {} missing returns, clipped {} records. {} remaining.",
        report.initial_records,
        report.duplicates_removed,
        filled,
        report.clipped,
        ui::style_text(&report.remaining_records.to_string(), ui::StyleType::TotalValue)
    )
}
