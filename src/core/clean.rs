//! Repairs missing and out-of-range values in the raw fund table.
use crate::core::fund::{Fund, RawFund};
use crate::core::stats::median;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

pub const MIN_EXPENSE_RATIO: f64 = 0.01;
pub const MIN_FUND_AGE: f64 = 0.1;
pub const MIN_AUM: f64 = 1.0;

/// What the cleaner changed, for logging and display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    pub initial_records: usize,
    pub duplicates_removed: usize,
    /// Missing values filled per return column (1Y, 3Y, 5Y).
    pub filled_from_category: [usize; 3],
    pub filled_from_global: [usize; 3],
    pub clipped: usize,
    pub remaining_records: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cleaned {
    pub funds: Vec<Fund>,
    pub report: CleaningReport,
}

/// Deduplicates by scheme name, fills missing returns and clamps floors.
///
/// Missing returns take the median of the same category; if the whole
/// category lacks the metric, the median of the column (after category
/// filling) is used. If the column has no values at all the return is set
/// to 0.
pub fn clean(raw: Vec<RawFund>) -> Cleaned {
    let mut report = CleaningReport {
        initial_records: raw.len(),
        ..Default::default()
    };

    let mut seen = HashSet::new();
    let mut rows: Vec<RawFund> = raw
        .into_iter()
        .filter(|f| seen.insert(f.scheme_name.clone()))
        .collect();
    report.duplicates_removed = report.initial_records - rows.len();
    debug!("Removed {} duplicate schemes", report.duplicates_removed);

    let accessors: [fn(&mut RawFund) -> &mut Option<f64>; 3] = [
        |f| &mut f.return_1y,
        |f| &mut f.return_3y,
        |f| &mut f.return_5y,
    ];
    for (i, get) in accessors.iter().enumerate() {
        let (by_category, global) = fill_returns(&mut rows, *get);
        report.filled_from_category[i] = by_category;
        report.filled_from_global[i] = global;
    }

    let funds: Vec<Fund> = rows
        .into_iter()
        .map(|raw| {
            let (fund, clipped) = into_clipped(raw);
            if clipped {
                report.clipped += 1;
            }
            fund
        })
        .collect();

    report.remaining_records = funds.len();
    info!(
        "Cleaned {} records ({} duplicates removed, {} clipped)",
        report.remaining_records, report.duplicates_removed, report.clipped
    );

    Cleaned { funds, report }
}

/// Fills one return column in place. Returns (category fills, global fills).
fn fill_returns(rows: &mut [RawFund], get: fn(&mut RawFund) -> &mut Option<f64>) -> (usize, usize) {
    let mut values_by_category: HashMap<String, Vec<f64>> = HashMap::new();
    for row in rows.iter_mut() {
        let slot = get(row);
        if slot.is_some_and(|v| !v.is_finite()) {
            *slot = None;
        }
        let value = *slot;
        let values = values_by_category.entry(row.category.clone()).or_default();
        if let Some(v) = value {
            values.push(v);
        }
    }
    let category_medians: HashMap<String, Option<f64>> = values_by_category
        .into_iter()
        .map(|(category, values)| (category, median(values)))
        .collect();

    let mut by_category = 0;
    for row in rows.iter_mut() {
        let fill = category_medians.get(&row.category).copied().flatten();
        let slot = get(row);
        if slot.is_none() && fill.is_some() {
            *slot = fill;
            by_category += 1;
        }
    }

    let mut by_global = 0;
    if rows.iter_mut().any(|r| get(r).is_none()) {
        let global = median(rows.iter_mut().filter_map(|r| *get(r))).unwrap_or_else(|| {
            warn!("Return column has no values; filling with 0");
            0.0
        });
        for row in rows.iter_mut() {
            let slot = get(row);
            if slot.is_none() {
                *slot = Some(global);
                by_global += 1;
            }
        }
    }

    (by_category, by_global)
}

fn into_clipped(raw: RawFund) -> (Fund, bool) {
    let expense_ratio = raw.expense_ratio.max(MIN_EXPENSE_RATIO);
    let fund_age = raw.fund_age.max(MIN_FUND_AGE);
    let aum = raw.aum.max(MIN_AUM);
    let clipped =
        expense_ratio != raw.expense_ratio || fund_age != raw.fund_age || aum != raw.aum;

    let fund = Fund {
        scheme_name: raw.scheme_name,
        amc_name: raw.amc_name,
        fund_type: raw.fund_type,
        category: raw.category,
        sub_category: raw.sub_category,
        risk_level: raw.risk_level,
        fund_rating: raw.fund_rating,
        return_1y: raw.return_1y.unwrap_or_default(),
        return_3y: raw.return_3y.unwrap_or_default(),
        return_5y: raw.return_5y.unwrap_or_default(),
        expense_ratio,
        nav: raw.nav,
        aum,
        fund_age,
        min_sip: raw.min_sip,
        min_lumpsum: raw.min_lumpsum,
        fund_manager: raw.fund_manager,
        investment_strategy: raw.investment_strategy,
    };
    (fund, clipped)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::fund::RiskLevel;

    pub(crate) fn raw_fund(name: &str, category: &str, return_3y: Option<f64>) -> RawFund {
        RawFund {
            scheme_name: name.to_string(),
            amc_name: "SBI Mutual Fund".to_string(),
            fund_type: "Equity".to_string(),
            category: category.to_string(),
            sub_category: "Bluechip".to_string(),
            risk_level: RiskLevel::Moderate,
            fund_rating: 3,
            return_1y: Some(10.0),
            return_3y,
            return_5y: Some(12.0),
            expense_ratio: 1.0,
            nav: 100.0,
            aum: 1000.0,
            fund_age: 5.0,
            min_sip: 500.0,
            min_lumpsum: 5000.0,
            fund_manager: "R. Srinivasan".to_string(),
            investment_strategy: "Growth".to_string(),
        }
    }

    #[test]
    fn fills_missing_return_from_same_category() {
        let cleaned = clean(vec![
            raw_fund("A", "Large Cap", Some(10.0)),
            raw_fund("B", "Large Cap", None),
            raw_fund("C", "Mid Cap", Some(30.0)),
        ]);
        assert_eq!(cleaned.funds[1].return_3y, 10.0);
        assert_eq!(cleaned.report.filled_from_category[1], 1);
        assert_eq!(cleaned.report.filled_from_global[1], 0);
    }

    #[test]
    fn falls_back_to_global_median_when_category_is_empty() {
        let cleaned = clean(vec![
            raw_fund("A", "Large Cap", Some(10.0)),
            raw_fund("B", "Large Cap", Some(20.0)),
            raw_fund("C", "Mid Cap", Some(30.0)),
            raw_fund("D", "Liquid", None),
        ]);
        assert_eq!(cleaned.funds[3].return_3y, 20.0);
        assert_eq!(cleaned.report.filled_from_global[1], 1);
    }

    #[test]
    fn column_without_values_becomes_zero() {
        let cleaned = clean(vec![
            raw_fund("A", "Large Cap", None),
            raw_fund("B", "Mid Cap", None),
        ]);
        assert!(cleaned.funds.iter().all(|f| f.return_3y == 0.0));
    }

    #[test]
    fn non_finite_return_is_treated_as_missing() {
        let cleaned = clean(vec![
            raw_fund("A", "Large Cap", Some(10.0)),
            raw_fund("B", "Large Cap", Some(f64::NAN)),
            raw_fund("C", "Mid Cap", Some(f64::INFINITY)),
        ]);
        assert_eq!(cleaned.funds[1].return_3y, 10.0);
        assert_eq!(cleaned.funds[2].return_3y, 10.0);
        assert_eq!(cleaned.report.filled_from_category[1], 1);
        assert_eq!(cleaned.report.filled_from_global[1], 1);
    }

    #[test]
    fn keeps_first_duplicate() {
        let mut second = raw_fund("A", "Large Cap", Some(99.0));
        second.amc_name = "HDFC Mutual Fund".to_string();
        let cleaned = clean(vec![
            raw_fund("A", "Large Cap", Some(10.0)),
            second,
            raw_fund("B", "Large Cap", Some(12.0)),
        ]);
        assert_eq!(cleaned.funds.len(), 2);
        assert_eq!(cleaned.funds[0].amc_name, "SBI Mutual Fund");
        assert_eq!(cleaned.funds[0].return_3y, 10.0);
        assert_eq!(cleaned.report.duplicates_removed, 1);
    }

    #[test]
    fn clamps_floors() {
        let mut fund = raw_fund("A", "Liquid", Some(5.0));
        fund.expense_ratio = -0.2;
        fund.fund_age = 0.0;
        fund.aum = 0.5;
        let cleaned = clean(vec![fund, raw_fund("B", "Liquid", Some(6.0))]);
        let f = &cleaned.funds[0];
        assert_eq!(f.expense_ratio, MIN_EXPENSE_RATIO);
        assert_eq!(f.fund_age, MIN_FUND_AGE);
        assert_eq!(f.aum, MIN_AUM);
        assert_eq!(cleaned.report.clipped, 1);
    }

    #[test]
    fn cleaned_table_satisfies_invariants() {
        let mut rows = Vec::new();
        for i in 0..20 {
            let ret = if i % 3 == 0 { None } else { Some(i as f64) };
            let mut f = raw_fund(&format!("F{}", i % 15), ["Liquid", "ELSS"][i % 2], ret);
            f.return_1y = if i % 4 == 0 { None } else { Some(1.0) };
            f.expense_ratio = i as f64 * 0.1 - 1.0;
            f.aum = i as f64 - 5.0;
            rows.push(f);
        }
        let cleaned = clean(rows);
        let names: HashSet<_> = cleaned.funds.iter().map(|f| &f.scheme_name).collect();
        assert_eq!(names.len(), cleaned.funds.len());
        for f in &cleaned.funds {
            assert!(f.expense_ratio >= MIN_EXPENSE_RATIO);
            assert!(f.fund_age >= MIN_FUND_AGE);
            assert!(f.aum >= MIN_AUM);
            assert!(f.return_1y.is_finite() && f.return_3y.is_finite() && f.return_5y.is_finite());
        }
    }
}
