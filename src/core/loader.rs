//! Reads the raw fund table from a delimited file.
use crate::core::error::LoadError;
use crate::core::fund::{
    AUM, EXPENSE_RATIO, FUND_AGE, FUND_RATING, MAX_RATING, MIN_LUMPSUM, MIN_RATING, MIN_SIP, NAV,
    REQUIRED_COLUMNS, RawFund,
};
use csv::StringRecord;
use std::fmt::Display;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Loads every row of the CSV file at `path`.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawFund>, LoadError> {
    let path = path.as_ref();
    let reader = csv::Reader::from_path(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let funds = read_funds(reader)?;
    info!("Loaded {} records from {}", funds.len(), path.display());
    Ok(funds)
}

/// Loads every row from an in-memory or streamed CSV source.
pub fn load_from_reader<R: Read>(rdr: R) -> Result<Vec<RawFund>, LoadError> {
    read_funds(csv::Reader::from_reader(rdr))
}

fn read_funds<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<RawFund>, LoadError> {
    let headers: StringRecord = reader
        .headers()
        .map_err(LoadError::Header)?
        .iter()
        .map(str::trim)
        .collect();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }
    debug!("Header check passed: {} columns", headers.len());

    let mut funds = Vec::new();
    let mut record = StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => return Err(invalid_row(e.position().map_or(0, |p| p.line()), e)),
        }
        let line = record.position().map_or(0, |p| p.line());
        let fund: RawFund = record
            .deserialize(Some(&headers))
            .map_err(|e| invalid_row(line, e))?;
        validate(&fund).map_err(|message| LoadError::InvalidRow { line, message })?;
        funds.push(fund);
    }

    if funds.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(funds)
}

fn invalid_row(line: u64, err: impl Display) -> LoadError {
    LoadError::InvalidRow {
        line,
        message: err.to_string(),
    }
}

/// Range checks serde cannot express: the rating scale and finite metrics.
fn validate(fund: &RawFund) -> Result<(), String> {
    if !(MIN_RATING..=MAX_RATING).contains(&fund.fund_rating) {
        return Err(format!(
            "`{FUND_RATING}` must be between {MIN_RATING} and {MAX_RATING}, got {}",
            fund.fund_rating
        ));
    }
    let metrics = [
        (EXPENSE_RATIO, fund.expense_ratio),
        (NAV, fund.nav),
        (AUM, fund.aum),
        (FUND_AGE, fund.fund_age),
        (MIN_SIP, fund.min_sip),
        (MIN_LUMPSUM, fund.min_lumpsum),
    ];
    match metrics.iter().find(|(_, v)| !v.is_finite()) {
        Some((column, value)) => Err(format!("`{column}` must be a finite number, got {value}")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fund::RiskLevel;

    const HEADER: &str = "Scheme Name,AMC Name,Fund Type,Category,Sub Category,Risk Level,Fund Rating,Return 1Y (%),Return 3Y (%),Return 5Y (%),Expense Ratio (%),NAV (₹),AUM (Cr),Fund Age (Years),Min SIP (₹),Min Lumpsum (₹),Fund Manager,Investment Strategy";

    #[test]
    fn loads_rows_with_missing_returns() {
        let data = format!(
            "{HEADER}\n\
             SBI Bluechip Fund,SBI Mutual Fund,Equity,Large Cap,Bluechip,Moderately High,4,12.5,,14.1,0.9,75.2,12000.5,12.3,500,5000,R. Srinivasan,Growth\n"
        );
        let funds = load_from_reader(data.as_bytes()).unwrap();
        assert_eq!(funds.len(), 1);
        let fund = &funds[0];
        assert_eq!(fund.scheme_name, "SBI Bluechip Fund");
        assert_eq!(fund.risk_level, RiskLevel::ModeratelyHigh);
        assert_eq!(fund.fund_rating, 4);
        assert_eq!(fund.return_1y, Some(12.5));
        assert_eq!(fund.return_3y, None);
        assert_eq!(fund.min_sip, 500.0);
    }

    #[test]
    fn column_order_does_not_matter() {
        let data = "Investment Strategy,Fund Manager,Min Lumpsum (₹),Min SIP (₹),Fund Age (Years),AUM (Cr),NAV (₹),Expense Ratio (%),Return 5Y (%),Return 3Y (%),Return 1Y (%),Fund Rating,Risk Level,Sub Category,Category,Fund Type,AMC Name,Scheme Name\n\
                    Value,Atul Kumar,1000,100,3.5,250,18.4,1.1,9,8,7,3,Low,Gilt,Long Duration,Debt,UTI Mutual Fund,UTI Gilt Fund\n";
        let funds = load_from_reader(data.as_bytes()).unwrap();
        assert_eq!(funds[0].scheme_name, "UTI Gilt Fund");
        assert_eq!(funds[0].return_1y, Some(7.0));
        assert_eq!(funds[0].investment_strategy, "Value");
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let data = HEADER.replace(",AUM (Cr)", "");
        let err = load_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("AUM (Cr)")));
    }

    #[test]
    fn bad_value_reports_line() {
        let data = format!(
            "{HEADER}\n\
             A,SBI Mutual Fund,Equity,Large Cap,Bluechip,Low,four,1,2,3,0.9,75.2,100,2,500,5000,X,Growth\n"
        );
        let err = load_from_reader(data.as_bytes()).unwrap_err();
        match err {
            LoadError::InvalidRow { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_aum_is_rejected() {
        let data = format!(
            "{HEADER}\n\
             A,SBI Mutual Fund,Equity,Large Cap,Bluechip,Low,4,1,2,3,0.9,75.2,,2,500,5000,X,Growth\n"
        );
        assert!(matches!(
            load_from_reader(data.as_bytes()),
            Err(LoadError::InvalidRow { .. })
        ));
    }

    fn row(name: &str, category: &str, rating: &str, return_3y: &str, aum: &str) -> String {
        format!(
            "{name},SBI Mutual Fund,Equity,{category},Bluechip,Moderate,{rating},8,{return_3y},11,0.9,75.2,{aum},4,500,5000,R. Srinivasan,Growth\n"
        )
    }

    #[test]
    fn missing_markers_in_returns_are_empty() {
        let mut data = format!("{HEADER}\n");
        for (i, marker) in ["NaN", "nan", "NA", "N/A", "null", " NaN "].iter().enumerate() {
            data.push_str(&row(&format!("F{i}"), "Large Cap", "3", marker, "100"));
        }
        let funds = load_from_reader(data.as_bytes()).unwrap();
        assert_eq!(funds.len(), 6);
        assert!(funds.iter().all(|f| f.return_3y.is_none()));
        assert!(funds.iter().all(|f| f.return_1y == Some(8.0)));
    }

    #[test]
    fn nan_return_is_filled_from_category_median() {
        let data = format!(
            "{HEADER}\n{}{}{}",
            row("A", "Large Cap", "3", "10.0", "100"),
            row("B", "Large Cap", "3", "NaN", "200"),
            row("C", "Mid Cap", "3", "20.0", "300"),
        );
        let raw = load_from_reader(data.as_bytes()).unwrap();
        let output =
            crate::core::pipeline::run(raw, &crate::core::PipelineOptions::default(), &|_| ())
                .unwrap();

        let b = output
            .ranked
            .iter()
            .find(|f| f.fund.scheme_name == "B")
            .unwrap();
        assert_eq!(b.fund.return_3y, 10.0);
        assert!(output.ranked.iter().all(|f| f.score.is_finite()));
        assert!(output.dashboard.kpis.avg_return_3y.is_finite());
        let scores: Vec<f64> = output.ranked.iter().map(|f| f.score).collect();
        assert_eq!(scores.first().copied(), Some(100.0));
        assert_eq!(scores.last().copied(), Some(0.0));
    }

    #[test]
    fn rating_outside_scale_is_rejected() {
        for (rating, line) in [("9", 3), ("0", 3)] {
            let data = format!(
                "{HEADER}\n{}{}",
                row("A", "Large Cap", "4", "10", "100"),
                row("B", "Large Cap", rating, "10", "100"),
            );
            match load_from_reader(data.as_bytes()).unwrap_err() {
                LoadError::InvalidRow { line: l, message } => {
                    assert_eq!(l, line);
                    assert!(message.contains("Fund Rating"), "{message}");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn non_finite_required_metric_is_rejected() {
        let data = format!("{HEADER}\n{}", row("A", "Large Cap", "4", "10", "NaN"));
        match load_from_reader(data.as_bytes()).unwrap_err() {
            LoadError::InvalidRow { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("AUM (Cr)"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn padded_headers_are_trimmed() {
        let header = HEADER.replace("AUM (Cr)", " AUM (Cr) ").replace("Scheme Name", "Scheme Name ");
        let data = format!("{header}\n{}", row("A", "Large Cap", "4", "10", "250"));
        let funds = load_from_reader(data.as_bytes()).unwrap();
        assert_eq!(funds[0].aum, 250.0);
        assert_eq!(funds[0].scheme_name, "A");
    }

    #[test]
    fn header_only_is_empty() {
        assert!(matches!(
            load_from_reader(HEADER.as_bytes()),
            Err(LoadError::Empty)
        ));
    }
}
