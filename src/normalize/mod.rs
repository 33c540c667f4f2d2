//! Normalization of raw screener rows into typed [`Transaction`]s.
//!
//! Pure and deterministic. A malformed row is dropped and counted, never an
//! error: the invariant downstream stages rely on is that every surviving
//! transaction has a ticker and a trade date.

mod num;
mod title;

use chrono::NaiveDate;

use crate::core::{Column, RawRow, TradeAction, Transaction};

/// Rows dropped during normalization, counted by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DropCounts {
    /// No ticker survived cleanup.
    pub missing_ticker: usize,
    /// The trade date was absent or unparseable.
    pub bad_trade_date: usize,
}

impl DropCounts {
    #[must_use]
    pub const fn total(self) -> usize {
        self.missing_ticker + self.bad_trade_date
    }
}

/// The outcome of normalizing a batch of raw rows.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NormalizeOutcome {
    pub transactions: Vec<Transaction>,
    pub dropped: DropCounts,
}

/// Normalize raw screener rows into transactions.
///
/// Numeric cells tolerate `$`, thousands separators, `+`, `%` and `>`;
/// unparsable numerics become `None`, never zero. Share and value magnitudes
/// are kept unsigned, with direction carried by [`TradeAction`]. ΔOwn is
/// clamped to 1000.
#[must_use]
pub fn normalize(rows: &[RawRow]) -> NormalizeOutcome {
    let mut transactions = Vec::with_capacity(rows.len());
    let mut dropped = DropCounts::default();

    for row in rows {
        let ticker = clean_ticker(row.get(Column::Ticker).unwrap_or(""));
        if ticker.is_empty() {
            tracing::debug!(raw = ?row.get(Column::Ticker), "dropping row without ticker");
            dropped.missing_ticker += 1;
            continue;
        }
        let Some(trade_date) = row.get(Column::TradeDate).and_then(parse_date) else {
            tracing::debug!(
                ticker,
                raw = ?row.get(Column::TradeDate),
                "dropping row with bad trade date"
            );
            dropped.bad_trade_date += 1;
            continue;
        };

        let shares = row
            .get(Column::Qty)
            .and_then(num::to_i64)
            .map(i64::unsigned_abs);
        let price = row
            .get(Column::TradePrice)
            .and_then(num::to_f64)
            .map(f64::abs);
        let trade_value = row
            .get(Column::ValueUsd)
            .and_then(num::to_f64)
            .map(f64::abs)
            .or_else(|| match (shares, price) {
                (Some(q), Some(p)) => Some(q as f64 * p),
                _ => None,
            });

        transactions.push(Transaction {
            ticker,
            company: non_empty(row.get(Column::Company)),
            industry: non_empty(row.get(Column::Industry)),
            insider_name: row.get(Column::Insider).unwrap_or("").trim().to_string(),
            title: title::classify(row.get(Column::Title).unwrap_or("")),
            trade_date,
            filing_date: row.get(Column::FilingDate).and_then(parse_date),
            action: row
                .get(Column::TradeType)
                .map_or_else(|| TradeAction::Other(String::new()), parse_action),
            shares,
            price_per_share: price,
            trade_value,
            ownership_change_pct: row
                .get(Column::OwnershipChangePct)
                .and_then(num::to_f64)
                .map(|v| v.min(1000.0)),
        });
    }

    tracing::debug!(
        kept = transactions.len(),
        dropped = dropped.total(),
        "normalized rows"
    );
    NormalizeOutcome {
        transactions,
        dropped,
    }
}

/// Uppercase and strip everything outside `[A-Z.-]`.
fn clean_ticker(raw: &str) -> String {
    raw.to_ascii_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || *c == '.' || *c == '-')
        .collect()
}

/// First whitespace-separated token as `YYYY-MM-DD`; filing cells carry a
/// trailing time-of-day.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let token = raw.split_whitespace().next()?;
    NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()
}

/// Classify the `TradeType` cell. The source prefixes a single-letter code
/// ("P - Purchase", "S - Sale+OE"); only P and S qualify. Codeless free text
/// falls back to keyword matching.
fn parse_action(raw: &str) -> TradeAction {
    let t = raw.trim();
    let upper = t.to_ascii_uppercase();
    let code = upper.split([' ', '-']).next().unwrap_or("");
    match code {
        "P" => TradeAction::Buy,
        "S" => TradeAction::Sale,
        c if c.len() == 1 => TradeAction::Other(t.to_string()),
        _ if upper.contains("PURCHASE") || upper.contains("BUY") => TradeAction::Buy,
        _ if upper.contains("SALE") || upper.contains("SELL") => TradeAction::Sale,
        _ => TradeAction::Other(t.to_string()),
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    match s.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => None,
    }
}
