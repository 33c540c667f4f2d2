//! One-call pipeline over the whole flow: fetch, normalize, optionally roll
//! up, enrich, score.
//!
//! Stages run strictly in sequence; each consumes the previous stage's full
//! output. The report carries per-stage counts alongside the ranking so
//! dropped rows and failed lookups are never silent.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use url::Url;

use crate::core::client::{CacheMode, RetryConfig};
use crate::core::{CancelToken, IrClient, IrError, PageSource, QuoteLookup, ScreenRecord};
use crate::enrich::EnrichBuilder;
use crate::normalize::{DropCounts, normalize};
use crate::rollup::{self, RollupConfig};
use crate::scoring::{ScoredResult, WeightProfile, score};
use crate::screener::{ScreenerBuilder, ScreenerQuery, StopReason};

/// Results and per-stage diagnostics for one pipeline run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RunReport {
    /// Final ranking, best first.
    pub results: Vec<ScoredResult>,
    /// Raw rows parsed out of the listing pages.
    pub rows_fetched: usize,
    /// Pages that contributed rows.
    pub pages_fetched: usize,
    /// Why fetching stopped before the requested page count, if it did.
    pub stopped_early: Option<StopReason>,
    /// Rows dropped during normalization, by reason.
    pub dropped: DropCounts,
    /// Transactions that survived normalization.
    pub transactions: usize,
    /// Tickers after rollup; `None` when aggregation is off.
    pub rollups: Option<usize>,
    /// Tickers whose market lookup failed.
    pub enrich_failures: Vec<String>,
    /// Tickers unknown to the quote source.
    pub enrich_not_found: Vec<String>,
    /// Whether cancellation cut the run short.
    pub cancelled: bool,
}

/// Builder for an end-to-end screening run.
///
/// Defaults mirror the individual stage builders: one page, 700 ms between
/// pages, aggregation on with a 7-day cluster window, eight concurrent
/// lookups, and the stock weight profile.
pub struct PipelineBuilder {
    client: IrClient,
    listing: Option<Url>,
    query: ScreenerQuery,
    pages: usize,
    page_delay: Duration,
    rollup: bool,
    rollup_config: RollupConfig,
    enrich_concurrency: usize,
    profile: WeightProfile,
    reference_date: Option<NaiveDate>,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
    cancel: CancelToken,
    page_source: Option<Arc<dyn PageSource>>,
    quote_lookup: Option<Arc<dyn QuoteLookup>>,
}

impl PipelineBuilder {
    /// Creates a pipeline run against the client's configured endpoints.
    #[must_use]
    pub fn new(client: &IrClient) -> Self {
        Self {
            client: client.clone(),
            listing: None,
            query: ScreenerQuery::default(),
            pages: 1,
            page_delay: Duration::from_millis(700),
            rollup: true,
            rollup_config: RollupConfig::default(),
            enrich_concurrency: 8,
            profile: WeightProfile::default(),
            reference_date: None,
            cache_mode: CacheMode::Use,
            retry_override: None,
            cancel: CancelToken::default(),
            page_source: None,
            quote_lookup: None,
        }
    }

    /// Page through a specific listing URL instead of the screener base.
    #[must_use]
    pub fn listing_url(mut self, url: Url) -> Self {
        self.listing = Some(url);
        self
    }

    /// Replaces the structured query applied to the listing URL.
    #[must_use]
    pub fn query(mut self, query: ScreenerQuery) -> Self {
        self.query = query;
        self
    }

    /// How many listing pages to request. Default: 1.
    #[must_use]
    pub const fn pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }

    /// Minimum gap between consecutive page requests. Default: 700 ms.
    #[must_use]
    pub const fn page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Turns per-ticker aggregation on or off. (Default: `true`)
    #[must_use]
    pub const fn rollup(mut self, yes: bool) -> Self {
        self.rollup = yes;
        self
    }

    /// Sets the rollup cluster window in days. (Default: `7`)
    #[must_use]
    pub const fn cluster_days(mut self, days: i64) -> Self {
        self.rollup_config.cluster_days = days;
        self
    }

    /// Sets the maximum number of in-flight market lookups. (Default: `8`)
    #[must_use]
    pub const fn enrich_concurrency(mut self, n: usize) -> Self {
        self.enrich_concurrency = n;
        self
    }

    /// Sets the weight profile used for scoring.
    #[must_use]
    pub fn profile(mut self, profile: WeightProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Pins the reference date recency is measured against.
    ///
    /// Defaults to today (UTC) at the moment the run starts.
    #[must_use]
    pub const fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Sets the cache mode for every request in the run.
    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Overrides the client's retry policy for every request in the run.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Attaches a cancellation token observed by the fetch and enrich stages.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Swaps in an alternative page retrieval backend.
    #[must_use]
    pub fn page_source(mut self, source: Arc<dyn PageSource>) -> Self {
        self.page_source = Some(source);
        self
    }

    /// Swaps in an alternative market data backend.
    #[must_use]
    pub fn quote_lookup(mut self, lookup: Arc<dyn QuoteLookup>) -> Self {
        self.quote_lookup = Some(lookup);
        self
    }

    /// Runs the pipeline to completion.
    ///
    /// A cancelled run is not an error: whatever rows and lookups completed
    /// before the token tripped are scored and returned, with
    /// [`RunReport::cancelled`] set.
    ///
    /// # Errors
    ///
    /// [`IrError::Config`] when the weight profile is invalid (checked before
    /// any request goes out), [`IrError::SourceUnavailable`] when the first
    /// listing page cannot be retrieved, and [`IrError::EmptyRun`] when an
    /// uncancelled run ends normalization with zero usable transactions.
    #[tracing::instrument(skip(self), err, fields(pages = self.pages, rollup = self.rollup))]
    pub async fn run(self) -> Result<RunReport, IrError> {
        self.profile.validate()?;
        let reference_date = self
            .reference_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        let mut screener = ScreenerBuilder::new(&self.client)
            .query(self.query)
            .pages(self.pages)
            .page_delay(self.page_delay)
            .cache_mode(self.cache_mode)
            .retry_policy(self.retry_override.clone())
            .cancel_token(self.cancel.clone());
        if let Some(url) = self.listing {
            screener = screener.listing_url(url);
        }
        if let Some(source) = self.page_source {
            screener = screener.page_source(source);
        }
        let fetched = screener.fetch().await?;
        let fetch_cancelled = fetched.stopped_early == Some(StopReason::Cancelled);

        let normalized = normalize(&fetched.rows);
        let transactions = normalized.transactions.len();
        if transactions == 0 && !fetch_cancelled {
            return Err(IrError::EmptyRun);
        }

        let (records, rollups): (Vec<ScreenRecord>, Option<usize>) = if self.rollup {
            let rolled = rollup::aggregate(&normalized.transactions, self.rollup_config);
            let tickers = rolled.len();
            (
                rolled.into_iter().map(ScreenRecord::Rollup).collect(),
                Some(tickers),
            )
        } else {
            (
                normalized
                    .transactions
                    .into_iter()
                    .map(ScreenRecord::Transaction)
                    .collect(),
                None,
            )
        };

        let mut enricher = EnrichBuilder::new(&self.client)
            .records(records)
            .concurrency(self.enrich_concurrency)
            .cache_mode(self.cache_mode)
            .retry_policy(self.retry_override)
            .cancel_token(self.cancel);
        if let Some(lookup) = self.quote_lookup {
            enricher = enricher.quote_lookup(lookup);
        }
        let enriched = enricher.run().await;

        let results = score(&enriched.records, &self.profile, reference_date)?;
        let cancelled = fetch_cancelled || enriched.cancelled;

        tracing::debug!(
            results = results.len(),
            rows = fetched.rows.len(),
            dropped = normalized.dropped.total(),
            cancelled,
            "pipeline run finished"
        );
        Ok(RunReport {
            results,
            rows_fetched: fetched.rows.len(),
            pages_fetched: fetched.pages_fetched,
            stopped_early: fetched.stopped_early,
            dropped: normalized.dropped,
            transactions,
            rollups,
            enrich_failures: enriched.failures,
            enrich_not_found: enriched.not_found,
            cancelled,
        })
    }
}
