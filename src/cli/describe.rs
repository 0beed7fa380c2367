use super::ui;
use crate::core::clean;
use crate::core::config::AppConfig;
use crate::core::stats::{self, DatasetDescription};
use anyhow::Result;
use comfy_table::Cell;

impl DatasetDescription {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Column"),
            ui::header_cell("Count"),
            ui::header_cell("Mean"),
            ui::header_cell("Std"),
            ui::header_cell("Min"),
            ui::header_cell("25%"),
            ui::header_cell("50%"),
            ui::header_cell("75%"),
            ui::header_cell("Max"),
        ]);

        for column in &self.columns {
            table.add_row(vec![
                Cell::new(column.name),
                Cell::new(column.count),
                ui::number_cell(column.mean, 2),
                ui::format_optional_cell(column.std, |s| format!("{s:.2}")),
                ui::number_cell(column.min, 2),
                ui::number_cell(column.p25, 2),
                ui::number_cell(column.p50, 2),
                ui::number_cell(column.p75, 2),
                ui::number_cell(column.max, 2),
            ]);
        }

        let mut output = table.to_string();
        output.push_str(&format!(
            "\n\nFund Types: {}  Categories: {}  AMCs: {}  Fund Managers: {}",
            ui::style_text(&self.fund_types.to_string(), ui::StyleType::TotalLabel),
            ui::style_text(&self.categories.to_string(), ui::StyleType::TotalLabel),
            ui::style_text(&self.amcs.to_string(), ui::StyleType::TotalLabel),
            ui::style_text(&self.fund_managers.to_string(), ui::StyleType::TotalLabel),
        ));
        output
    }
}

/// Prints the statistical snapshot of the cleaned input. Writes nothing.
pub fn run(config: &AppConfig) -> Result<DatasetDescription> {
    let raw = super::load_input(config)?;
    let cleaned = clean::clean(raw);
    let description = stats::describe(&cleaned.funds);

    println!(
        "{} {}\n",
        ui::style_text("Dataset:", ui::StyleType::Title),
        ui::style_text(&config.input.display().to_string(), ui::StyleType::Subtle)
    );
    println!("{}", description.display_as_table());
    Ok(description)
}
