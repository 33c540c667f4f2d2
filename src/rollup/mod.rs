//! Per-ticker aggregation of transactions.
//!
//! Collapses qualifying (buy/sale) rows into one [`RollupRecord`] per ticker.
//! Every reduction is commutative and associative, so input order never
//! affects the result; the output is sorted by ticker.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::{InsiderTitle, RollupRecord, TradeAction, Transaction};

/// Configuration for the aggregation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RollupConfig {
    /// Trades within this many days of a ticker's latest trade count toward
    /// `cluster_count`.
    pub cluster_days: i64,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self { cluster_days: 7 }
    }
}

/// Collapse transactions into one record per distinct ticker.
///
/// Non-qualifying rows (`TradeAction::Other`) are ignored; tickers left with
/// zero qualifying rows are omitted rather than zero-filled.
#[must_use]
pub fn aggregate(transactions: &[Transaction], config: RollupConfig) -> Vec<RollupRecord> {
    let mut groups: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
    for t in transactions {
        if t.action.is_qualifying() {
            groups.entry(t.ticker.as_str()).or_default().push(t);
        }
    }

    let records: Vec<RollupRecord> = groups
        .into_iter()
        .filter_map(|(ticker, rows)| reduce_group(ticker, &rows, config))
        .collect();
    tracing::debug!(tickers = records.len(), "rolled up transactions");
    records
}

fn reduce_group(ticker: &str, rows: &[&Transaction], config: RollupConfig) -> Option<RollupRecord> {
    let first = rows.first()?;

    let mut net_trade_value = 0.0f64;
    let mut net_shares = 0i64;
    let mut insiders: BTreeSet<&str> = BTreeSet::new();
    let mut max_title = InsiderTitle::Unknown;
    let mut title_weighted_count = 0.0f64;
    let mut own_seen = false;
    let mut own_pos_sum = 0.0f64;
    let mut latest_trade = first.trade_date;
    let mut latest_filing = first.filing_date;

    for t in rows {
        if let Some(v) = t.signed_value() {
            net_trade_value += v;
        }
        if let Some(q) = t.shares {
            let q = i64::try_from(q).unwrap_or(i64::MAX);
            net_shares += match t.action {
                TradeAction::Buy => q,
                TradeAction::Sale => -q,
                TradeAction::Other(_) => 0,
            };
        }
        if !t.insider_name.is_empty() {
            insiders.insert(t.insider_name.as_str());
        }
        max_title = max_title.max(t.title);
        title_weighted_count += t.title.multiplier();
        if let Some(o) = t.ownership_change_pct {
            own_seen = true;
            if o > 0.0 {
                own_pos_sum += o;
            }
        }
        latest_trade = latest_trade.max(t.trade_date);
        if let Some(f) = t.filing_date {
            latest_filing = Some(latest_filing.map_or(f, |d| d.max(f)));
        }
    }

    let window_start = latest_trade - chrono::Duration::days(config.cluster_days);
    let cluster_count = rows.iter().filter(|t| t.trade_date >= window_start).count();

    // date ties resolved by the larger value so input order cannot matter
    let latest_trade_price = rows
        .iter()
        .filter_map(|t| t.price_per_share.map(|p| (t.trade_date, p)))
        .max_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)))
        .map(|(_, p)| p);
    let company = newest_string(rows, |t| t.company.as_deref());
    let industry = newest_string(rows, |t| t.industry.as_deref());

    let transaction_count = rows.len();
    Some(RollupRecord {
        ticker: ticker.to_string(),
        company,
        industry,
        transaction_count,
        net_trade_value,
        net_shares,
        distinct_insiders: if insiders.is_empty() {
            transaction_count
        } else {
            insiders.len()
        },
        max_title_rank: max_title,
        title_weighted_count,
        ownership_change_agg: own_seen.then_some(own_pos_sum),
        cluster_count,
        most_recent_trade_date: latest_trade,
        most_recent_filing_date: latest_filing,
        latest_trade_price,
    })
}

fn newest_string<'a>(
    rows: &[&'a Transaction],
    field: impl Fn(&'a Transaction) -> Option<&'a str>,
) -> Option<String> {
    rows.iter()
        .filter_map(|t| field(t).map(|s| (t.trade_date, s)))
        .max_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(b.1)))
        .map(|(_, s)| s.to_string())
}
