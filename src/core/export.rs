//! Writes the ranked table and summary document to disk.
//!
//! Four artifacts are produced in the output directory: the full processed
//! table and the top-N extract as CSV, the same extract as a spreadsheet,
//! and the dashboard document as pretty-printed JSON.
use crate::core::aggregate::{Dashboard, TopFund};
use crate::core::error::ExportError;
use crate::core::fund::RankedFund;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const PROCESSED_CSV: &str = "mutual_funds_processed.csv";
pub const TOP_CSV: &str = "top_30_mutual_funds.csv";
pub const TOP_XLSX: &str = "top_30_mutual_funds.xlsx";
pub const DASHBOARD_JSON: &str = "dashboard_data.json";
pub const TOP_SHEET_NAME: &str = "Top 30 Funds";

/// Full processed row: every input column plus the derived ones.
#[derive(Debug, Serialize)]
struct ProcessedRow<'a> {
    #[serde(rename = "Scheme Name")]
    scheme_name: &'a str,
    #[serde(rename = "AMC Name")]
    amc_name: &'a str,
    #[serde(rename = "Fund Type")]
    fund_type: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Sub Category")]
    sub_category: &'a str,
    #[serde(rename = "Risk Level")]
    risk_level: &'a str,
    #[serde(rename = "Fund Rating")]
    fund_rating: u8,
    #[serde(rename = "Return 1Y (%)")]
    return_1y: f64,
    #[serde(rename = "Return 3Y (%)")]
    return_3y: f64,
    #[serde(rename = "Return 5Y (%)")]
    return_5y: f64,
    #[serde(rename = "Expense Ratio (%)")]
    expense_ratio: f64,
    #[serde(rename = "NAV (₹)")]
    nav: f64,
    #[serde(rename = "AUM (Cr)")]
    aum: f64,
    #[serde(rename = "Fund Age (Years)")]
    fund_age: f64,
    #[serde(rename = "Min SIP (₹)")]
    min_sip: f64,
    #[serde(rename = "Min Lumpsum (₹)")]
    min_lumpsum: f64,
    #[serde(rename = "Fund Manager")]
    fund_manager: &'a str,
    #[serde(rename = "Investment Strategy")]
    investment_strategy: &'a str,
    #[serde(rename = "Norm_Return_1Y")]
    norm_return_1y: f64,
    #[serde(rename = "Norm_Return_3Y")]
    norm_return_3y: f64,
    #[serde(rename = "Norm_Return_5Y")]
    norm_return_5y: f64,
    #[serde(rename = "Norm_Expense_Ratio")]
    norm_expense_ratio: f64,
    #[serde(rename = "Norm_Fund_Age")]
    norm_fund_age: f64,
    #[serde(rename = "Norm_AUM")]
    norm_aum: f64,
    #[serde(rename = "Score")]
    score: f64,
    #[serde(rename = "Rank")]
    rank: usize,
}

impl<'a> From<&'a RankedFund> for ProcessedRow<'a> {
    fn from(r: &'a RankedFund) -> Self {
        let f = &r.fund;
        ProcessedRow {
            scheme_name: &f.scheme_name,
            amc_name: &f.amc_name,
            fund_type: &f.fund_type,
            category: &f.category,
            sub_category: &f.sub_category,
            risk_level: f.risk_level.as_str(),
            fund_rating: f.fund_rating,
            return_1y: f.return_1y,
            return_3y: f.return_3y,
            return_5y: f.return_5y,
            expense_ratio: f.expense_ratio,
            nav: f.nav,
            aum: f.aum,
            fund_age: f.fund_age,
            min_sip: f.min_sip,
            min_lumpsum: f.min_lumpsum,
            fund_manager: &f.fund_manager,
            investment_strategy: &f.investment_strategy,
            norm_return_1y: r.norm.return_1y,
            norm_return_3y: r.norm.return_3y,
            norm_return_5y: r.norm.return_5y,
            norm_expense_ratio: r.norm.expense_ratio,
            norm_fund_age: r.norm.fund_age,
            norm_aum: r.norm.aum,
            score: r.score,
            rank: r.rank,
        }
    }
}

/// Paths of the artifacts written by [`Exporter::write_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFiles {
    pub processed_csv: PathBuf,
    pub top_csv: PathBuf,
    pub top_xlsx: PathBuf,
    pub dashboard_json: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    pub fn write_processed_csv(&self, ranked: &[RankedFund], path: &Path) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in ranked {
            writer.serialize(ProcessedRow::from(row))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_top_csv(&self, top: &[TopFund], path: &Path) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_path(path)?;
        if top.is_empty() {
            writer.write_record(TopFund::COLUMNS)?;
        }
        for row in top {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_top_xlsx(&self, top: &[TopFund], path: &Path) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name(TOP_SHEET_NAME)?;

        for (col, name) in TopFund::COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *name, &header)?;
        }

        for (i, fund) in top.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_number(row, 0, fund.rank as f64)?;
            sheet.write_string(row, 1, &fund.scheme_name)?;
            sheet.write_string(row, 2, &fund.amc_name)?;
            sheet.write_string(row, 3, &fund.fund_type)?;
            sheet.write_string(row, 4, &fund.category)?;
            sheet.write_string(row, 5, &fund.sub_category)?;
            sheet.write_string(row, 6, &fund.risk_level)?;
            sheet.write_number(row, 7, f64::from(fund.fund_rating))?;
            sheet.write_number(row, 8, fund.return_1y)?;
            sheet.write_number(row, 9, fund.return_3y)?;
            sheet.write_number(row, 10, fund.return_5y)?;
            sheet.write_number(row, 11, fund.expense_ratio)?;
            sheet.write_number(row, 12, fund.nav)?;
            sheet.write_number(row, 13, fund.aum)?;
            sheet.write_number(row, 14, fund.fund_age)?;
            sheet.write_number(row, 15, fund.min_sip)?;
            sheet.write_number(row, 16, fund.min_lumpsum)?;
            sheet.write_string(row, 17, &fund.fund_manager)?;
            sheet.write_string(row, 18, &fund.investment_strategy)?;
            sheet.write_number(row, 19, fund.score)?;
        }

        workbook.save(path)?;
        Ok(())
    }

    pub fn write_dashboard_json(&self, dashboard: &Dashboard, path: &Path) -> Result<(), ExportError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, dashboard)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Writes all four artifacts, creating the output directory if needed.
    ///
    /// On failure the error is paired with the path being written.
    pub fn write_all(
        &self,
        ranked: &[RankedFund],
        top: &[TopFund],
        dashboard: &Dashboard,
    ) -> Result<ExportedFiles, (PathBuf, ExportError)> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| (self.output_dir.clone(), ExportError::Io(e)))?;

        let files = ExportedFiles {
            processed_csv: self.path_for(PROCESSED_CSV),
            top_csv: self.path_for(TOP_CSV),
            top_xlsx: self.path_for(TOP_XLSX),
            dashboard_json: self.path_for(DASHBOARD_JSON),
        };

        let with_path = |path: &Path| {
            let path = path.to_path_buf();
            move |e: ExportError| (path, e)
        };

        self.write_processed_csv(ranked, &files.processed_csv)
            .map_err(with_path(&files.processed_csv))?;
        info!("Processed data: {}", files.processed_csv.display());

        self.write_top_csv(top, &files.top_csv)
            .map_err(with_path(&files.top_csv))?;
        info!("Top {} funds: {}", top.len(), files.top_csv.display());

        self.write_top_xlsx(top, &files.top_xlsx)
            .map_err(with_path(&files.top_xlsx))?;
        info!("Top {} spreadsheet: {}", top.len(), files.top_xlsx.display());

        self.write_dashboard_json(dashboard, &files.dashboard_json)
            .map_err(with_path(&files.dashboard_json))?;
        info!("Dashboard JSON: {}", files.dashboard_json.display());

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::{build_dashboard, top_funds};
    use crate::core::fund::{Fund, NormalizedMetrics, RiskLevel};
    use tempfile::TempDir;

    fn ranked_fund(name: &str, rank: usize) -> RankedFund {
        RankedFund {
            fund: Fund {
                scheme_name: name.to_string(),
                amc_name: "Quant Mutual Fund".to_string(),
                fund_type: "Equity".to_string(),
                category: "Small Cap".to_string(),
                sub_category: "Emerging".to_string(),
                risk_level: RiskLevel::VeryHigh,
                fund_rating: 5,
                return_1y: 30.5,
                return_3y: 28.1,
                return_5y: 25.0,
                expense_ratio: 0.64,
                nav: 212.4,
                aum: 18000.0,
                fund_age: 9.5,
                min_sip: 1000.0,
                min_lumpsum: 5000.0,
                fund_manager: "Ankit Agarwal".to_string(),
                investment_strategy: "Active".to_string(),
            },
            norm: NormalizedMetrics {
                return_1y: 1.0,
                ..Default::default()
            },
            score: 100.0 / rank as f64,
            rank,
        }
    }

    #[test]
    fn writes_all_artifacts() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let ranked = vec![ranked_fund("Alpha", 1), ranked_fund("Beta", 2)];
        let top = top_funds(&ranked, 30);
        let dashboard = build_dashboard(&ranked, 30);

        let exporter = Exporter::new(dir.path().join("out"));
        let files = exporter
            .write_all(&ranked, &top, &dashboard)
            .map_err(|(path, e)| anyhow::anyhow!("{}: {e}", path.display()))?;

        let processed = fs::read_to_string(&files.processed_csv)?;
        let mut lines = processed.lines();
        let header = lines.next().unwrap_or_default();
        assert!(header.starts_with("Scheme Name,AMC Name"));
        assert!(header.ends_with("Norm_AUM,Score,Rank"));
        assert_eq!(lines.count(), 2);

        let top_csv = fs::read_to_string(&files.top_csv)?;
        assert!(top_csv.starts_with("Rank,Scheme Name"));
        assert!(top_csv.lines().next().unwrap_or_default().ends_with("Investment Strategy,Score"));

        assert!(files.top_xlsx.exists());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&files.dashboard_json)?)?;
        assert_eq!(json["kpis"]["total_funds"], 2);
        assert_eq!(json["top_30"][1]["Scheme Name"], "Beta");
        Ok(())
    }

    #[test]
    fn empty_top_extract_still_has_header() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let exporter = Exporter::new(dir.path());
        let path = exporter.path_for(TOP_CSV);
        exporter.write_top_csv(&[], &path)?;
        let content = fs::read_to_string(&path)?;
        assert_eq!(content.trim_end(), TopFund::COLUMNS.join(","));
        Ok(())
    }
}
