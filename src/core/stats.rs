//! Descriptive statistics over cleaned fund data.
use crate::core::fund::{self, Fund};
use std::collections::HashSet;

/// Median of the values, ignoring NaN. `None` when nothing remains.
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    Some(quantile_sorted(&sorted, 0.5))
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Rounds to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: &'static str,
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl ColumnStats {
    fn from_values(name: &'static str, values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            name,
            count: sorted.len(),
            mean: mean(&sorted)?,
            std: sample_std(&sorted),
            min: *sorted.first()?,
            p25: quantile_sorted(&sorted, 0.25),
            p50: quantile_sorted(&sorted, 0.5),
            p75: quantile_sorted(&sorted, 0.75),
            max: *sorted.last()?,
        })
    }
}

/// Informational snapshot of the cleaned table. Has no effect on scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDescription {
    pub columns: Vec<ColumnStats>,
    pub fund_types: usize,
    pub categories: usize,
    pub amcs: usize,
    pub fund_managers: usize,
}

pub fn describe(funds: &[Fund]) -> DatasetDescription {
    let extractors: [(&'static str, fn(&Fund) -> f64); 7] = [
        (fund::RETURN_1Y, |f| f.return_1y),
        (fund::RETURN_3Y, |f| f.return_3y),
        (fund::RETURN_5Y, |f| f.return_5y),
        (fund::EXPENSE_RATIO, |f| f.expense_ratio),
        (fund::NAV, |f| f.nav),
        (fund::AUM, |f| f.aum),
        (fund::FUND_AGE, |f| f.fund_age),
    ];

    let columns = extractors
        .iter()
        .filter_map(|(name, get)| {
            let values: Vec<f64> = funds.iter().map(get).collect();
            ColumnStats::from_values(*name, &values)
        })
        .collect();

    let distinct = |get: fn(&Fund) -> &str| funds.iter().map(get).collect::<HashSet<_>>().len();

    DatasetDescription {
        columns,
        fund_types: distinct(|f| f.fund_type.as_str()),
        categories: distinct(|f| f.category.as_str()),
        amcs: distinct(|f| f.amc_name.as_str()),
        fund_managers: distinct(|f| f.fund_manager.as_str()),
    }
}
