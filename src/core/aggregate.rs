//! Grouped summaries and the top-N extract of the ranked table.
//!
//! Everything here is computed from the ranked table alone, so the
//! resulting [`Dashboard`] is self-contained.
use crate::core::fund::{Fund, RankedFund, RiskLevel};
use crate::core::stats::round_to;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub const TOP_AMC_LIMIT: usize = 15;
pub const TOP_MANAGER_LIMIT: usize = 12;

/// One row of the top-N extract.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopFund {
    #[serde(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Scheme Name")]
    pub scheme_name: String,
    #[serde(rename = "AMC Name")]
    pub amc_name: String,
    #[serde(rename = "Fund Type")]
    pub fund_type: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Sub Category")]
    pub sub_category: String,
    #[serde(rename = "Risk Level")]
    pub risk_level: String,
    #[serde(rename = "Fund Rating")]
    pub fund_rating: u8,
    #[serde(rename = "Return 1Y (%)")]
    pub return_1y: f64,
    #[serde(rename = "Return 3Y (%)")]
    pub return_3y: f64,
    #[serde(rename = "Return 5Y (%)")]
    pub return_5y: f64,
    #[serde(rename = "Expense Ratio (%)")]
    pub expense_ratio: f64,
    #[serde(rename = "NAV (₹)")]
    pub nav: f64,
    #[serde(rename = "AUM (Cr)")]
    pub aum: f64,
    #[serde(rename = "Fund Age (Years)")]
    pub fund_age: f64,
    #[serde(rename = "Min SIP (₹)")]
    pub min_sip: f64,
    #[serde(rename = "Min Lumpsum (₹)")]
    pub min_lumpsum: f64,
    #[serde(rename = "Fund Manager")]
    pub fund_manager: String,
    #[serde(rename = "Investment Strategy")]
    pub investment_strategy: String,
    #[serde(rename = "Score")]
    pub score: f64,
}

impl TopFund {
    pub const COLUMNS: [&'static str; 20] = [
        "Rank",
        "Scheme Name",
        "AMC Name",
        "Fund Type",
        "Category",
        "Sub Category",
        "Risk Level",
        "Fund Rating",
        "Return 1Y (%)",
        "Return 3Y (%)",
        "Return 5Y (%)",
        "Expense Ratio (%)",
        "NAV (₹)",
        "AUM (Cr)",
        "Fund Age (Years)",
        "Min SIP (₹)",
        "Min Lumpsum (₹)",
        "Fund Manager",
        "Investment Strategy",
        "Score",
    ];
}

impl From<&RankedFund> for TopFund {
    fn from(r: &RankedFund) -> Self {
        let f = &r.fund;
        TopFund {
            rank: r.rank,
            scheme_name: f.scheme_name.clone(),
            amc_name: f.amc_name.clone(),
            fund_type: f.fund_type.clone(),
            category: f.category.clone(),
            sub_category: f.sub_category.clone(),
            risk_level: f.risk_level.to_string(),
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
            fund_manager: f.fund_manager.clone(),
            investment_strategy: f.investment_strategy.clone(),
            score: r.score,
        }
    }
}

/// Every ranked fund, as listed for client-side filtering.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FundListing {
    #[serde(rename = "Scheme Name")]
    pub scheme_name: String,
    #[serde(rename = "AMC Name")]
    pub amc_name: String,
    #[serde(rename = "Fund Type")]
    pub fund_type: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Sub Category")]
    pub sub_category: String,
    #[serde(rename = "Risk Level")]
    pub risk_level: String,
    #[serde(rename = "Fund Rating")]
    pub fund_rating: u8,
    #[serde(rename = "Return 1Y (%)")]
    pub return_1y: f64,
    #[serde(rename = "Return 3Y (%)")]
    pub return_3y: f64,
    #[serde(rename = "Return 5Y (%)")]
    pub return_5y: f64,
    #[serde(rename = "Expense Ratio (%)")]
    pub expense_ratio: f64,
    #[serde(rename = "NAV (₹)")]
    pub nav: f64,
    #[serde(rename = "AUM (Cr)")]
    pub aum: f64,
    #[serde(rename = "Fund Age (Years)")]
    pub fund_age: f64,
    #[serde(rename = "Min SIP (₹)")]
    pub min_sip: f64,
    #[serde(rename = "Min Lumpsum (₹)")]
    pub min_lumpsum: f64,
    #[serde(rename = "Fund Manager")]
    pub fund_manager: String,
    #[serde(rename = "Investment Strategy")]
    pub investment_strategy: String,
    #[serde(rename = "Score")]
    pub score: f64,
    #[serde(rename = "Rank")]
    pub rank: usize,
}

impl From<&RankedFund> for FundListing {
    fn from(r: &RankedFund) -> Self {
        let top = TopFund::from(r);
        FundListing {
            scheme_name: top.scheme_name,
            amc_name: top.amc_name,
            fund_type: top.fund_type,
            category: top.category,
            sub_category: top.sub_category,
            risk_level: top.risk_level,
            fund_rating: top.fund_rating,
            return_1y: top.return_1y,
            return_3y: top.return_3y,
            return_5y: top.return_5y,
            expense_ratio: top.expense_ratio,
            nav: top.nav,
            aum: top.aum,
            fund_age: top.fund_age,
            min_sip: top.min_sip,
            min_lumpsum: top.min_lumpsum,
            fund_manager: top.fund_manager,
            investment_strategy: top.investment_strategy,
            score: top.score,
            rank: top.rank,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Kpis {
    pub total_funds: usize,
    pub total_aum: f64,
    pub avg_return_3y: f64,
    pub avg_expense_ratio: f64,
    pub avg_sip: f64,
    pub avg_lumpsum: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AmcSummary {
    #[serde(rename = "AMC Name")]
    pub amc_name: String,
    #[serde(rename = "Return 3Y (%)")]
    pub return_3y: f64,
    #[serde(rename = "AUM (Cr)")]
    pub aum: f64,
    #[serde(rename = "Fund Count")]
    pub fund_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ManagerSummary {
    #[serde(rename = "Fund Manager")]
    pub fund_manager: String,
    #[serde(rename = "AUM (Cr)")]
    pub aum: f64,
    #[serde(rename = "Return 3Y (%)")]
    pub return_3y: f64,
    #[serde(rename = "Fund Count")]
    pub fund_count: usize,
}

/// Facet domains for presentation-side filtering.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Filters {
    pub fund_types: Vec<String>,
    pub categories: Vec<String>,
    pub risk_levels: Vec<String>,
    pub amc_names: Vec<String>,
    pub fund_ratings: Vec<u8>,
    pub strategies: Vec<String>,
}

/// The structured summary document consumed by the presentation layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Dashboard {
    pub kpis: Kpis,
    pub returns_by_category: BTreeMap<String, f64>,
    pub aum_by_fund_type: BTreeMap<String, f64>,
    pub top_amcs: Vec<AmcSummary>,
    pub fund_managers: Vec<ManagerSummary>,
    pub expense_by_strategy: BTreeMap<String, f64>,
    pub risk_distribution: IndexMap<String, usize>,
    pub rating_distribution: BTreeMap<u8, usize>,
    pub sip_by_type: BTreeMap<String, f64>,
    pub lumpsum_by_type: BTreeMap<String, f64>,
    pub category_counts: IndexMap<String, usize>,
    pub top_30: Vec<TopFund>,
    pub all_funds: Vec<FundListing>,
    pub filters: Filters,
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: usize,
    sum: f64,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Rollup {
    return_3y: Accumulator,
    aum: f64,
}

fn group<'a>(
    funds: &'a [RankedFund],
    key: fn(&Fund) -> &str,
    value: fn(&Fund) -> f64,
) -> BTreeMap<&'a str, Accumulator> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for f in funds {
        groups.entry(key(&f.fund)).or_default().add(value(&f.fund));
    }
    groups
}

fn means(groups: BTreeMap<&str, Accumulator>, decimals: i32) -> BTreeMap<String, f64> {
    groups
        .into_iter()
        .map(|(k, acc)| (k.to_string(), round_to(acc.mean(), decimals)))
        .collect()
}

fn sums(groups: BTreeMap<&str, Accumulator>, decimals: i32) -> BTreeMap<String, f64> {
    groups
        .into_iter()
        .map(|(k, acc)| (k.to_string(), round_to(acc.sum, decimals)))
        .collect()
}

fn rollup<'a>(funds: &'a [RankedFund], key: fn(&Fund) -> &str) -> Vec<(&'a str, Rollup)> {
    let mut groups: BTreeMap<&str, Rollup> = BTreeMap::new();
    for f in funds {
        let entry = groups.entry(key(&f.fund)).or_default();
        entry.return_3y.add(f.fund.return_3y);
        entry.aum += f.fund.aum;
    }
    groups.into_iter().collect()
}

/// Counts per value, most frequent first. Ties keep first-seen order.
fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for v in values {
        *counts.entry(v.to_string()).or_default() += 1;
    }
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// The first `n` funds by rank.
pub fn top_funds(ranked: &[RankedFund], n: usize) -> Vec<TopFund> {
    ranked.iter().take(n).map(TopFund::from).collect()
}

pub fn kpis(ranked: &[RankedFund]) -> Kpis {
    let n = ranked.len();
    let mean = |get: fn(&Fund) -> f64| {
        if n == 0 {
            0.0
        } else {
            round_to(ranked.iter().map(|f| get(&f.fund)).sum::<f64>() / n as f64, 2)
        }
    };
    Kpis {
        total_funds: n,
        total_aum: round_to(ranked.iter().map(|f| f.fund.aum).sum(), 2),
        avg_return_3y: mean(|f| f.return_3y),
        avg_expense_ratio: mean(|f| f.expense_ratio),
        avg_sip: mean(|f| f.min_sip),
        avg_lumpsum: mean(|f| f.min_lumpsum),
    }
}

pub fn top_amcs(ranked: &[RankedFund], limit: usize) -> Vec<AmcSummary> {
    let mut amcs = rollup(ranked, |f| f.amc_name.as_str());
    amcs.sort_by(|(_, a), (_, b)| b.return_3y.mean().total_cmp(&a.return_3y.mean()));
    amcs.into_iter()
        .take(limit)
        .map(|(name, r)| AmcSummary {
            amc_name: name.to_string(),
            return_3y: round_to(r.return_3y.mean(), 2),
            aum: round_to(r.aum, 2),
            fund_count: r.return_3y.count,
        })
        .collect()
}

pub fn top_managers(ranked: &[RankedFund], limit: usize) -> Vec<ManagerSummary> {
    let mut managers = rollup(ranked, |f| f.fund_manager.as_str());
    managers.sort_by(|(_, a), (_, b)| b.aum.total_cmp(&a.aum));
    managers
        .into_iter()
        .take(limit)
        .map(|(name, r)| ManagerSummary {
            fund_manager: name.to_string(),
            aum: round_to(r.aum, 2),
            return_3y: round_to(r.return_3y.mean(), 2),
            fund_count: r.return_3y.count,
        })
        .collect()
}

pub fn filters(ranked: &[RankedFund]) -> Filters {
    let funds = || ranked.iter().map(|r| &r.fund);
    Filters {
        fund_types: distinct_sorted(funds().map(|f| f.fund_type.as_str())),
        categories: distinct_sorted(funds().map(|f| f.category.as_str())),
        risk_levels: RiskLevel::CANONICAL
            .iter()
            .map(|l| l.as_str().to_string())
            .collect(),
        amc_names: distinct_sorted(funds().map(|f| f.amc_name.as_str())),
        fund_ratings: funds()
            .map(|f| f.fund_rating)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        strategies: distinct_sorted(funds().map(|f| f.investment_strategy.as_str())),
    }
}

/// Builds the full summary document. `ranked` must be sorted by rank.
pub fn build_dashboard(ranked: &[RankedFund], top_n: usize) -> Dashboard {
    let mut rating_distribution = BTreeMap::new();
    for f in ranked {
        *rating_distribution.entry(f.fund.fund_rating).or_insert(0) += 1;
    }

    let dashboard = Dashboard {
        kpis: kpis(ranked),
        returns_by_category: means(
            group(ranked, |f| f.category.as_str(), |f| f.return_3y),
            2,
        ),
        aum_by_fund_type: sums(group(ranked, |f| f.fund_type.as_str(), |f| f.aum), 2),
        top_amcs: top_amcs(ranked, TOP_AMC_LIMIT),
        fund_managers: top_managers(ranked, TOP_MANAGER_LIMIT),
        expense_by_strategy: means(
            group(ranked, |f| f.investment_strategy.as_str(), |f| f.expense_ratio),
            2,
        ),
        risk_distribution: value_counts(ranked.iter().map(|f| f.fund.risk_level.as_str())),
        rating_distribution,
        sip_by_type: means(group(ranked, |f| f.fund_type.as_str(), |f| f.min_sip), 0),
        lumpsum_by_type: means(group(ranked, |f| f.fund_type.as_str(), |f| f.min_lumpsum), 0),
        category_counts: value_counts(ranked.iter().map(|f| f.fund.category.as_str())),
        top_30: top_funds(ranked, top_n),
        all_funds: ranked.iter().map(FundListing::from).collect(),
        filters: filters(ranked),
    };
    debug!(
        "Dashboard built: {} categories, {} AMCs, {} top funds",
        dashboard.returns_by_category.len(),
        dashboard.filters.amc_names.len(),
        dashboard.top_30.len()
    );
    dashboard
}
