use super::ui;
use crate::core::aggregate::{TopFund, top_funds};
use crate::core::config::AppConfig;
use anyhow::Result;

/// Ranks the input and prints the best `count` funds. Writes nothing.
pub fn run(config: &AppConfig, count: usize) -> Result<Vec<TopFund>> {
    let output = super::run_pipeline(config)?;
    let top = top_funds(&output.ranked, count);

    println!(
        "{} ({} of {} funds)\n{}",
        ui::style_text("Top Ranked Funds", ui::StyleType::Title),
        top.len(),
        output.ranked.len(),
        ui::ranked_table(&top)
    );
    Ok(top)
}
