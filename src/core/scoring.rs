//! Composite scoring and ranking.
//!
//! ```text
//! raw = w3y * norm_return_3y + wexp * (1 - norm_expense_ratio)
//!     + w1y * norm_return_1y + wage * norm_fund_age + waum * norm_aum
//!     + risk_bonus(risk_level) + (rating - 3) * rating_step
//! ```
//!
//! The raw score is min-max rescaled to `[0, 100]` across the table and
//! rounded to two decimals, then funds are stably sorted by score
//! (descending) and numbered from 1.
use crate::core::error::{PipelineError, Stage};
use crate::core::fund::{NormalizedFund, RankedFund};
use crate::core::normalize::MinMax;
use crate::core::stats::round_to;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Rating treated as neutral by the rating adjustment.
pub const NEUTRAL_RATING: i32 = 3;

/// Weights of the normalized metrics in the composite score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoreWeights {
    pub return_3y: f64,
    /// Applied to `1 - norm_expense_ratio`, so cheaper funds score higher.
    pub expense_ratio: f64,
    pub return_1y: f64,
    pub fund_age: f64,
    pub aum: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            return_3y: 0.40,
            expense_ratio: 0.25,
            return_1y: 0.20,
            fund_age: 0.10,
            aum: 0.05,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.return_3y + self.expense_ratio + self.return_1y + self.fund_age + self.aum
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    /// Score added per rating star above the neutral rating.
    pub rating_step: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            rating_step: 0.02,
        }
    }
}

/// Unscaled composite score of one fund.
pub fn raw_score(fund: &NormalizedFund, config: &ScoringConfig) -> f64 {
    let w = &config.weights;
    let n = &fund.norm;
    let weighted = w.return_3y * n.return_3y
        + w.expense_ratio * (1.0 - n.expense_ratio)
        + w.return_1y * n.return_1y
        + w.fund_age * n.fund_age
        + w.aum * n.aum;
    let rating_adjustment =
        (i32::from(fund.fund.fund_rating) - NEUTRAL_RATING) as f64 * config.rating_step;
    weighted + fund.fund.risk_level.bonus() + rating_adjustment
}

/// Scores every fund and returns the table sorted by rank.
pub fn score_and_rank(
    funds: Vec<NormalizedFund>,
    config: &ScoringConfig,
) -> Result<Vec<RankedFund>, PipelineError> {
    if (config.weights.total() - 1.0).abs() > 1e-6 {
        warn!(
            "Score weights sum to {:.4}, not 1; scores are still rescaled to 0-100",
            config.weights.total()
        );
    }

    let raw: Vec<f64> = funds.iter().map(|f| raw_score(f, config)).collect();
    let scaler = MinMax::fit(raw.iter().copied()).ok_or(PipelineError::EmptyTable(Stage::Score))?;
    if scaler.is_degenerate() {
        warn!("All funds have the same raw score; every score is 0");
    }

    let mut ranked: Vec<RankedFund> = funds
        .into_iter()
        .zip(raw)
        .map(|(nf, raw)| RankedFund {
            fund: nf.fund,
            norm: nf.norm,
            score: round_to(scaler.transform(raw) * 100.0, 2),
            rank: 0,
        })
        .collect();

    // sort_by is stable: equal scores keep their input order
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    for (i, fund) in ranked.iter_mut().enumerate() {
        fund.rank = i + 1;
    }

    if let (Some(top), Some(bottom)) = (ranked.first(), ranked.last()) {
        info!(
            "Scoring complete. Top score: {}, Bottom score: {}",
            top.score, bottom.score
        );
    }
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clean::clean;
    use crate::core::clean::tests::raw_fund;
    use crate::core::fund::{NormalizedMetrics, RawFund, RiskLevel};
    use crate::core::normalize::normalize;

    fn ranked_from(raw: Vec<RawFund>) -> Vec<RankedFund> {
        let normalized = normalize(clean(raw).funds).unwrap();
        score_and_rank(normalized, &ScoringConfig::default()).unwrap()
    }

    fn sample() -> Vec<RawFund> {
        (0..12)
            .map(|i| {
                let mut f = raw_fund(&format!("Fund {i}"), "Large Cap", Some(5.0 + i as f64));
                f.return_1y = Some(((i * 7) % 11) as f64);
                f.expense_ratio = 0.2 + (i % 5) as f64 * 0.3;
                f.aum = 100.0 * (i + 1) as f64;
                f.fund_age = 1.0 + (i % 4) as f64;
                f.fund_rating = (i % 5 + 1) as u8;
                f.risk_level = RiskLevel::CANONICAL[i % 6].clone();
                f
            })
            .collect()
    }

    #[test]
    fn scores_span_zero_to_hundred() {
        let ranked = ranked_from(sample());
        let max = ranked.iter().map(|f| f.score).fold(f64::MIN, f64::max);
        let min = ranked.iter().map(|f| f.score).fold(f64::MAX, f64::min);
        assert_eq!(max, 100.0);
        assert_eq!(min, 0.0);
    }

    #[test]
    fn ranks_are_a_permutation_with_non_increasing_scores() {
        let ranked = ranked_from(sample());
        let ranks: Vec<usize> = ranked.iter().map(|f| f.rank).collect();
        assert_eq!(ranks, (1..=ranked.len()).collect::<Vec<_>>());
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn scoring_is_deterministic() {
        let first = ranked_from(sample());
        let second = ranked_from(sample());
        let key = |r: &[RankedFund]| {
            r.iter()
                .map(|f| (f.fund.scheme_name.clone(), f.score, f.rank))
                .collect::<Vec<_>>()
        };
        assert_eq!(key(&first), key(&second));
    }

    #[test]
    fn risk_and_rating_bonus_delta() {
        let mut low = raw_fund("Low", "Large Cap", Some(10.0));
        low.risk_level = RiskLevel::Low;
        low.fund_rating = 5;
        let mut high = raw_fund("High", "Large Cap", Some(10.0));
        high.risk_level = RiskLevel::VeryHigh;
        high.fund_rating = 1;

        let normalized = normalize(clean(vec![low, high]).funds).unwrap();
        let config = ScoringConfig::default();
        let delta = raw_score(&normalized[0], &config) - raw_score(&normalized[1], &config);
        assert!((delta - 0.18).abs() < 1e-9);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = ranked_from(vec![
            raw_fund("First", "Large Cap", Some(10.0)),
            raw_fund("Second", "Large Cap", Some(10.0)),
            raw_fund("Best", "Large Cap", Some(20.0)),
        ]);
        let names: Vec<&str> = ranked.iter().map(|f| f.fund.scheme_name.as_str()).collect();
        assert_eq!(names, ["Best", "First", "Second"]);
        assert_eq!(ranked[1].score, ranked[2].score);
    }

    #[test]
    fn weights_apply_to_normalized_metrics() {
        let fund = NormalizedFund {
            fund: clean(vec![raw_fund("A", "Large Cap", Some(1.0))]).funds.remove(0),
            norm: NormalizedMetrics {
                return_1y: 1.0,
                return_3y: 1.0,
                return_5y: 1.0,
                expense_ratio: 0.0,
                fund_age: 1.0,
                aum: 1.0,
            },
        };
        // moderate risk +0.01, neutral rating
        assert!((raw_score(&fund, &ScoringConfig::default()) - 1.01).abs() < 1e-9);
    }

    #[test]
    fn single_fund_scores_zero() {
        let ranked = ranked_from(vec![raw_fund("Only", "Liquid", Some(4.0))]);
        assert_eq!(ranked[0].score, 0.0);
        assert_eq!(ranked[0].rank, 1);
    }
}
