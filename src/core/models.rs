use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/* ----- RAW TABLE ROWS (shared by screener/ and normalize/) ----- */

/// Canonical columns of the insider-screener listing table.
///
/// Source headers are free text; `from_header` folds a raw header cell into
/// one of these. Headers with no canonical mapping (checkbox and performance
/// columns among them) are ignored by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Column {
    FilingDate,
    TradeDate,
    Ticker,
    Company,
    Industry,
    Insider,
    Title,
    NumInsiders,
    TradeType,
    TradePrice,
    Qty,
    Owned,
    OwnershipChangePct,
    ValueUsd,
}

impl Column {
    /// Map a raw header cell to its canonical column, if any.
    ///
    /// Folding: `Δ`/`δ` → `delta`, lowercase, strip everything outside
    /// `[a-z0-9]`. So `" ΔOwn "` and `"&Delta;Own"` both land on
    /// `OwnershipChangePct`.
    #[must_use]
    pub fn from_header(raw: &str) -> Option<Self> {
        let mut key = String::with_capacity(raw.len());
        for ch in raw.chars() {
            if ch == 'Δ' || ch == 'δ' {
                key.push_str("delta");
            } else if ch.is_ascii_alphanumeric() {
                key.push(ch.to_ascii_lowercase());
            }
        }
        match key.as_str() {
            "filingdate" => Some(Self::FilingDate),
            "tradedate" => Some(Self::TradeDate),
            "ticker" => Some(Self::Ticker),
            "companyname" => Some(Self::Company),
            "industry" => Some(Self::Industry),
            "insidername" => Some(Self::Insider),
            "title" => Some(Self::Title),
            "ins" => Some(Self::NumInsiders),
            "tradetype" => Some(Self::TradeType),
            "price" => Some(Self::TradePrice),
            "qty" => Some(Self::Qty),
            "owned" => Some(Self::Owned),
            "deltaown" => Some(Self::OwnershipChangePct),
            "value" => Some(Self::ValueUsd),
            _ => None,
        }
    }
}

/// One untyped row of the screener table: canonical column → raw cell text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RawRow {
    cells: BTreeMap<Column, String>,
}

impl RawRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, col: Column, text: impl Into<String>) {
        self.cells.insert(col, text.into());
    }

    #[must_use]
    pub fn get(&self, col: Column) -> Option<&str> {
        self.cells.get(&col).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

/* ----- TRANSACTIONS (shared by normalize/, rollup/, enrich/, scoring/) ----- */

/// Insider role parsed from the free-text `Title` cell.
///
/// Variants are ordered by seniority, so `Ord` picks the most senior title
/// across a group of filings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsiderTitle {
    Unknown,
    OtherOfficer,
    TenPercentOwner,
    Director,
    CooOrPresident,
    Cfo,
    Ceo,
}

impl InsiderTitle {
    /// Score multiplier for this role (more senior roles weigh more).
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Ceo => 1.00,
            Self::Cfo => 0.95,
            Self::CooOrPresident => 0.90,
            Self::Director => 0.75,
            Self::TenPercentOwner => 0.60,
            Self::OtherOfficer => 0.50,
            Self::Unknown => 0.30,
        }
    }

    /// Human-readable label for display and log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ceo => "CEO",
            Self::Cfo => "CFO",
            Self::CooOrPresident => "COO/President",
            Self::Director => "Director",
            Self::TenPercentOwner => "10% Owner",
            Self::OtherOfficer => "Officer",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for InsiderTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction kind parsed from the `TradeType` cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    Buy,
    Sale,
    /// Anything else (option exercise, gift, ...). Kept for display but
    /// excluded from rollups and scoring.
    Other(String),
}

impl TradeAction {
    /// Whether this row participates in rollups and scoring.
    #[must_use]
    pub const fn is_qualifying(&self) -> bool {
        matches!(self, Self::Buy | Self::Sale)
    }

    /// +1 for buys, -1 for sales, 0 otherwise.
    #[must_use]
    pub const fn sign(&self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sale => -1.0,
            Self::Other(_) => 0.0,
        }
    }
}

/// One normalized insider filing event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub ticker: String,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub insider_name: String,
    pub title: InsiderTitle,
    pub trade_date: NaiveDate,
    pub filing_date: Option<NaiveDate>,
    pub action: TradeAction,
    pub shares: Option<u64>,
    pub price_per_share: Option<f64>,
    pub trade_value: Option<f64>,
    /// ΔOwn, clamped to at most 1000 (percent).
    pub ownership_change_pct: Option<f64>,
}

impl Transaction {
    /// Recency anchor: filing date when present, else trade date.
    #[must_use]
    pub fn anchor_date(&self) -> NaiveDate {
        self.filing_date.unwrap_or(self.trade_date)
    }

    /// Trade value signed by direction (buys positive, sales negative).
    /// `None` for rows with no value or a non-qualifying action.
    #[must_use]
    pub fn signed_value(&self) -> Option<f64> {
        if !self.action.is_qualifying() {
            return None;
        }
        self.trade_value.map(|v| v * self.action.sign())
    }
}

/* ----- ROLLUPS (shared by rollup/, enrich/, scoring/) ----- */

/// Per-ticker aggregate of qualifying (buy/sale) transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupRecord {
    pub ticker: String,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub transaction_count: usize,
    /// Σ signed trade value (buys positive, sales negative).
    pub net_trade_value: f64,
    /// Σ signed share quantity (buys positive, sales negative).
    pub net_shares: i64,
    pub distinct_insiders: usize,
    /// Most senior title among contributing insiders.
    pub max_title_rank: InsiderTitle,
    /// Σ title multiplier over contributing rows.
    pub title_weighted_count: f64,
    /// Σ of positive ΔOwn values; `None` when no row carried ΔOwn at all.
    pub ownership_change_agg: Option<f64>,
    /// Rows whose trade date falls within the cluster window of the most
    /// recent trade date.
    pub cluster_count: usize,
    pub most_recent_trade_date: NaiveDate,
    pub most_recent_filing_date: Option<NaiveDate>,
    /// Price from the most recent dated row that has one.
    pub latest_trade_price: Option<f64>,
}

impl RollupRecord {
    /// Recency anchor: latest filing date when present, else latest trade date.
    #[must_use]
    pub fn anchor_date(&self) -> NaiveDate {
        self.most_recent_filing_date
            .unwrap_or(self.most_recent_trade_date)
    }
}

/* ----- ENRICHMENT (shared by enrich/, scoring/, pipeline/) ----- */

/// Either shape the pipeline can carry into enrichment and scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScreenRecord {
    Transaction(Transaction),
    Rollup(RollupRecord),
}

impl ScreenRecord {
    #[must_use]
    pub fn ticker(&self) -> &str {
        match self {
            Self::Transaction(t) => &t.ticker,
            Self::Rollup(r) => &r.ticker,
        }
    }

    #[must_use]
    pub fn company(&self) -> Option<&str> {
        match self {
            Self::Transaction(t) => t.company.as_deref(),
            Self::Rollup(r) => r.company.as_deref(),
        }
    }

    /// Title driving the score multiplier (a rollup uses its most senior
    /// contributor).
    #[must_use]
    pub fn title(&self) -> InsiderTitle {
        match self {
            Self::Transaction(t) => t.title,
            Self::Rollup(r) => r.max_title_rank,
        }
    }

    /// Recency anchor date.
    #[must_use]
    pub fn anchor_date(&self) -> NaiveDate {
        match self {
            Self::Transaction(t) => t.anchor_date(),
            Self::Rollup(r) => r.anchor_date(),
        }
    }

    /// Insider price the current market price is compared against.
    pub(crate) fn reference_price(&self) -> Option<f64> {
        match self {
            Self::Transaction(t) => t.price_per_share,
            Self::Rollup(r) => r.latest_trade_price,
        }
    }
}

/// Market data resolved for a single ticker.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MarketSnapshot {
    pub market_cap: Option<f64>,
    pub current_price: Option<f64>,
}

/// How a record's market lookup went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentStatus {
    /// Lookup succeeded (individual fields may still be absent upstream).
    Ok,
    /// Lookup failed in transit or decode; market fields are `None`.
    PartialFailure,
    /// The source does not know this ticker; market fields are `None`.
    NotFound,
}

/// A screen record plus whatever market data could be resolved for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub record: ScreenRecord,
    pub market_cap: Option<f64>,
    pub current_price: Option<f64>,
    /// `(current − insider price) / insider price`; negative means the stock
    /// now trades below what insiders paid.
    pub price_diff_pct: Option<f64>,
    pub enrichment_status: EnrichmentStatus,
}

impl EnrichedRecord {
    #[must_use]
    pub fn ticker(&self) -> &str {
        self.record.ticker()
    }
}
