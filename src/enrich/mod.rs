//! Market enrichment stage.
//!
//! Attaches current market data (price, market cap) to screened records via
//! a bounded concurrent fan-out against a [`QuoteLookup`]. Each distinct
//! ticker is looked up at most once per run, and a failed ticker degrades
//! only its own records.

mod quote;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::core::client::{CacheMode, RetryConfig};
use crate::core::{
    CancelToken, EnrichedRecord, EnrichmentStatus, IrClient, IrError, MarketSnapshot, QuoteLookup,
    ScreenRecord, quotes,
};

/// Result of an enrichment run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct EnrichOutcome {
    /// One enriched record per input record, in input order.
    pub records: Vec<EnrichedRecord>,
    /// Tickers whose lookup failed with a transport or server error.
    pub failures: Vec<String>,
    /// Tickers the quote source did not recognize.
    pub not_found: Vec<String>,
    /// Whether cancellation stopped the run before every ticker was looked up.
    pub cancelled: bool,
}

/// A builder for enriching screened records with current market data.
///
/// Lookups run concurrently, bounded by [`concurrency`](Self::concurrency).
/// No lookup error aborts the run: failures are recorded per ticker and the
/// affected records are kept with their market fields empty.
pub struct EnrichBuilder {
    client: IrClient,
    records: Vec<ScreenRecord>,
    lookup: Option<Arc<dyn QuoteLookup>>,
    concurrency: usize,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
    cancel: CancelToken,
}

impl EnrichBuilder {
    /// Creates a new enrichment builder using the client's quote API.
    pub fn new(client: &IrClient) -> Self {
        Self {
            client: client.clone(),
            records: Vec::new(),
            lookup: None,
            concurrency: 8,
            cache_mode: CacheMode::Use,
            retry_override: None,
            cancel: CancelToken::default(),
        }
    }

    /// Sets the records to enrich.
    #[must_use]
    pub fn records<I>(mut self, records: I) -> Self
    where
        I: IntoIterator<Item = ScreenRecord>,
    {
        self.records = records.into_iter().collect();
        self
    }

    /// Replaces the client's quote API with a custom lookup backend.
    #[must_use]
    pub fn quote_lookup(mut self, lookup: Arc<dyn QuoteLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Sets the maximum number of in-flight lookups. (Default: `8`)
    ///
    /// Values below 1 are treated as 1.
    #[must_use]
    pub const fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    /// Sets the cache mode for the built-in lookup.
    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Overrides the retry policy for the built-in lookup.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Attaches a cancellation token checked before each lookup is issued.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Looks up every distinct ticker and attaches the results.
    ///
    /// Records whose lookup did not complete (failure, unknown symbol, or
    /// cancellation) are kept with empty market fields and a status saying
    /// why.
    #[tracing::instrument(skip(self), fields(records = self.records.len()))]
    pub async fn run(self) -> EnrichOutcome {
        let concurrency = self.concurrency.max(1);
        let lookup: Arc<dyn QuoteLookup> = match self.lookup {
            Some(l) => l,
            None => Arc::new(HttpQuoteLookup {
                client: self.client,
                cache_mode: self.cache_mode,
                retry: self.retry_override,
            }),
        };
        let cancel = self.cancel;

        let mut unique: Vec<String> = Vec::new();
        {
            let mut seen: HashSet<&str> = HashSet::new();
            for r in &self.records {
                if seen.insert(r.ticker()) {
                    unique.push(r.ticker().to_string());
                }
            }
        }

        let lookup_ref: &dyn QuoteLookup = lookup.as_ref();
        let fetched: Vec<(String, Option<Fetched>)> =
            stream::iter(unique.iter().cloned().map(|ticker| {
                let cancel = cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        return (ticker, None);
                    }
                    let outcome = match lookup_ref.lookup(&ticker).await {
                        Ok(snap) => Fetched::Snapshot(snap),
                        Err(IrError::NotFound { .. }) => {
                            tracing::warn!(%ticker, "quote source does not know ticker");
                            Fetched::NotFound
                        }
                        Err(e) => {
                            tracing::warn!(%ticker, error = %e, "quote lookup failed");
                            Fetched::Failed
                        }
                    };
                    (ticker, Some(outcome))
                }
            }))
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut by_ticker: HashMap<String, Fetched> = HashMap::new();
        let mut cancelled = false;
        for (ticker, outcome) in fetched {
            match outcome {
                Some(f) => {
                    by_ticker.insert(ticker, f);
                }
                None => cancelled = true,
            }
        }

        let mut failures = Vec::new();
        let mut not_found = Vec::new();
        for t in &unique {
            match by_ticker.get(t.as_str()) {
                Some(Fetched::Failed) => failures.push(t.clone()),
                Some(Fetched::NotFound) => not_found.push(t.clone()),
                _ => {}
            }
        }

        let records: Vec<EnrichedRecord> = self
            .records
            .into_iter()
            .map(|record| {
                let (snapshot, status) = match by_ticker.get(record.ticker()) {
                    Some(Fetched::Snapshot(s)) => (*s, EnrichmentStatus::Ok),
                    Some(Fetched::NotFound) => (MarketSnapshot::default(), EnrichmentStatus::NotFound),
                    Some(Fetched::Failed) | None => {
                        (MarketSnapshot::default(), EnrichmentStatus::PartialFailure)
                    }
                };
                let price_diff_pct = match (record.reference_price(), snapshot.current_price) {
                    (Some(reference), Some(current)) if reference > 0.0 => {
                        Some((current - reference) / reference)
                    }
                    _ => None,
                };
                EnrichedRecord {
                    record,
                    market_cap: snapshot.market_cap,
                    current_price: snapshot.current_price,
                    price_diff_pct,
                    enrichment_status: status,
                }
            })
            .collect();

        tracing::debug!(
            tickers = unique.len(),
            failures = failures.len(),
            not_found = not_found.len(),
            cancelled,
            "enrichment finished"
        );
        EnrichOutcome {
            records,
            failures,
            not_found,
            cancelled,
        }
    }
}

enum Fetched {
    Snapshot(MarketSnapshot),
    NotFound,
    Failed,
}

struct HttpQuoteLookup {
    client: IrClient,
    cache_mode: CacheMode,
    retry: Option<RetryConfig>,
}

impl QuoteLookup for HttpQuoteLookup {
    fn lookup<'a>(
        &'a self,
        ticker: &'a str,
    ) -> core::pin::Pin<
        Box<dyn core::future::Future<Output = Result<MarketSnapshot, IrError>> + Send + 'a>,
    > {
        Box::pin(quotes::fetch_snapshot(
            &self.client,
            ticker,
            self.cache_mode,
            self.retry.as_ref(),
        ))
    }
}
