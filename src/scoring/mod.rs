//! Ranking of enriched records under a [`WeightProfile`].
//!
//! Each weighted factor is turned into an average-rank percentile over the
//! whole dataset, the percentiles are blended by normalized weight, and the
//! blend is scaled by the insider's title multiplier and (optionally) the
//! timing bonus. Percentiles need the complete dataset, so scoring runs
//! strictly after enrichment.

mod percentile;
mod profile;

pub use profile::{Factor, WeightProfile};

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::core::{EnrichedRecord, IrError, RollupRecord, ScreenRecord};
use percentile::Direction;

/// A ranked record with its scoring breakdown.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ScoredResult {
    /// 1-based position after sorting.
    pub rank: usize,
    /// Weighted percentile blend after multipliers.
    pub final_score: f64,
    /// Title multiplier that scaled the blend.
    pub title_multiplier: f64,
    /// Timing-bonus multiplier applied to the final score; `1.0` when none.
    pub timing_bonus: f64,
    /// Percentile per factor that participated in the blend.
    pub factor_percentiles: BTreeMap<Factor, f64>,
    /// The record being ranked.
    pub record: EnrichedRecord,
}

/// Scores and ranks enriched records under `profile`.
///
/// `reference_date` anchors recency: a record's age is the number of days
/// from its anchor date (filing date when known, trade date otherwise) to
/// the reference date. Output is sorted by descending score, ties broken by
/// ticker, so identical input always yields the identical ranking.
///
/// Factors with zero weight are ignored. A weighted factor that is null on
/// every record is left out of the blend; a factor that is null on only
/// some records gives those records the factor's worst observed percentile.
///
/// # Errors
/// Returns [`IrError::Config`] when the profile fails validation.
pub fn score(
    records: &[EnrichedRecord],
    profile: &WeightProfile,
    reference_date: NaiveDate,
) -> Result<Vec<ScoredResult>, IrError> {
    profile.validate()?;
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let mut ranked: BTreeMap<Factor, Vec<f64>> = BTreeMap::new();
    for (&factor, &weight) in &profile.weights {
        if weight <= 0.0 {
            continue;
        }
        let values: Vec<Option<f64>> = records
            .iter()
            .map(|r| factor_value(factor, r, reference_date))
            .collect();
        if let Some(pcts) = percentile::percentile_ranks(&values, direction(factor)) {
            ranked.insert(factor, pcts);
        }
    }

    let mut results: Vec<ScoredResult> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mut weight_sum = 0.0;
            let mut blend = 0.0;
            let mut factor_percentiles = BTreeMap::new();
            for (&factor, pcts) in &ranked {
                let w = profile.weights.get(&factor).copied().unwrap_or(0.0);
                weight_sum += w;
                blend += w * pcts[i];
                factor_percentiles.insert(factor, pcts[i]);
            }
            let base = if weight_sum > 0.0 { blend / weight_sum } else { 0.0 };

            let title_multiplier = record.record.title().multiplier();
            let timing_bonus = if profile.timing_bonus_enabled
                && age_days(record, reference_date) <= profile.timing_bonus_days
            {
                profile.timing_bonus_multiplier
            } else {
                1.0
            };
            let final_score = base * title_multiplier * timing_bonus;

            ScoredResult {
                rank: 0,
                final_score,
                title_multiplier,
                timing_bonus,
                factor_percentiles,
                record: record.clone(),
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.final_score
            .total_cmp(&a.final_score)
            .then_with(|| a.record.ticker().cmp(b.record.ticker()))
    });
    for (i, r) in results.iter_mut().enumerate() {
        r.rank = i + 1;
    }

    tracing::debug!(records = results.len(), profile = %profile.name, "scored records");
    Ok(results)
}

fn age_days(record: &EnrichedRecord, reference_date: NaiveDate) -> i64 {
    (reference_date - record.record.anchor_date()).num_days()
}

fn factor_value(factor: Factor, record: &EnrichedRecord, reference_date: NaiveDate) -> Option<f64> {
    match factor {
        Factor::TradeValue => match &record.record {
            ScreenRecord::Transaction(t) => t.trade_value,
            ScreenRecord::Rollup(r) => Some(r.net_trade_value),
        },
        Factor::TradeCount => rollup(record).map(|r| r.transaction_count as f64),
        Factor::DistinctInsiders => rollup(record).map(|r| r.distinct_insiders as f64),
        Factor::TitleWeightedCount => rollup(record).map(|r| r.title_weighted_count),
        Factor::OwnershipChange => match &record.record {
            ScreenRecord::Transaction(t) => t.ownership_change_pct,
            ScreenRecord::Rollup(r) => r.ownership_change_agg,
        },
        Factor::ClusterCount => rollup(record).map(|r| r.cluster_count as f64),
        Factor::MarketCap => record.market_cap,
        Factor::Recency => Some(age_days(record, reference_date) as f64),
        Factor::PriceDiff => record.price_diff_pct,
    }
}

const fn rollup(record: &EnrichedRecord) -> Option<&RollupRecord> {
    match &record.record {
        ScreenRecord::Rollup(r) => Some(r),
        ScreenRecord::Transaction(_) => None,
    }
}

const fn direction(factor: Factor) -> Direction {
    match factor {
        Factor::MarketCap | Factor::Recency | Factor::PriceDiff => Direction::LowerIsBetter,
        _ => Direction::HigherIsBetter,
    }
}
