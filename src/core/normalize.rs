//! Min-max scaling of the scored metrics.
use crate::core::error::{PipelineError, Stage};
use crate::core::fund::{Fund, NormalizedFund, NormalizedMetrics};
use tracing::{debug, warn};

/// A fitted min-max scaler for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    /// Fits the scaler to the finite values. `None` if there are none.
    pub fn fit(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(MinMax { min: v, max: v }),
                Some(m) => Some(MinMax {
                    min: m.min.min(v),
                    max: m.max.max(v),
                }),
            })
    }

    /// Zero-range columns cannot be scaled.
    pub fn is_degenerate(&self) -> bool {
        self.max - self.min == 0.0
    }

    /// Maps `min` to 0 and `max` to 1. Degenerate columns map everything to 0.
    pub fn transform(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

fn fit_column(name: &str, funds: &[Fund], get: fn(&Fund) -> f64) -> Result<MinMax, PipelineError> {
    let scaler = MinMax::fit(funds.iter().map(get))
        .ok_or(PipelineError::EmptyTable(Stage::Normalize))?;
    if scaler.is_degenerate() {
        warn!("Column {name} has zero range ({}); normalized to 0", scaler.min);
    } else {
        debug!("Column {name}: min {} max {}", scaler.min, scaler.max);
    }
    Ok(scaler)
}

/// Adds the six normalized columns. Row order is preserved.
pub fn normalize(funds: Vec<Fund>) -> Result<Vec<NormalizedFund>, PipelineError> {
    let return_1y = fit_column("Return 1Y", &funds, |f| f.return_1y)?;
    let return_3y = fit_column("Return 3Y", &funds, |f| f.return_3y)?;
    let return_5y = fit_column("Return 5Y", &funds, |f| f.return_5y)?;
    let expense_ratio = fit_column("Expense Ratio", &funds, |f| f.expense_ratio)?;
    let fund_age = fit_column("Fund Age", &funds, |f| f.fund_age)?;
    let aum = fit_column("AUM", &funds, |f| f.aum)?;

    Ok(funds
        .into_iter()
        .map(|fund| {
            let norm = NormalizedMetrics {
                return_1y: return_1y.transform(fund.return_1y),
                return_3y: return_3y.transform(fund.return_3y),
                return_5y: return_5y.transform(fund.return_5y),
                expense_ratio: expense_ratio.transform(fund.expense_ratio),
                fund_age: fund_age.transform(fund.fund_age),
                aum: aum.transform(fund.aum),
            };
            NormalizedFund { fund, norm }
        })
        .collect())
}
