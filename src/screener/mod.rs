//! Paginated retrieval of the insider screener listing.
//!
//! [`ScreenerBuilder`] walks `page=1..=pages` of a listing URL, parses each
//! page's `tinytable` into [`RawRow`]s, and reports how far it got. Retrieval
//! sits behind the [`PageSource`] trait so the HTTP backend can be swapped
//! without touching pagination or parsing.

mod api;
pub(crate) mod table;

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::core::{
    CancelToken, IrClient, IrError, PageSource, RawRow,
    client::{CacheMode, RetryConfig},
};

/// Why a fetch stopped before requesting all configured pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// A page carried no recognizable table rows; the listing is exhausted.
    Exhausted,
    /// A page after the first failed to fetch; earlier pages were kept.
    PageFailure {
        /// 1-based page number that failed.
        page: usize,
    },
    /// The cancel token was tripped between page requests.
    Cancelled,
}

/// The outcome of a screener fetch: raw rows plus pagination diagnostics.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FetchOutcome {
    pub rows: Vec<RawRow>,
    /// Pages that yielded rows.
    pub pages_fetched: usize,
    /// `None` when all requested pages were retrieved.
    pub stopped_early: Option<StopReason>,
}

/// Structured query parameters applied to the listing URL.
///
/// The lookback fields map to the source's `fd` (filing date) and `td`
/// (trade date) day-window parameters; anything else passes through `params`
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenerQuery {
    pub filing_lookback_days: Option<u32>,
    pub trade_lookback_days: Option<u32>,
    pub params: Vec<(String, String)>,
}

impl ScreenerQuery {
    fn apply(&self, url: &mut Url) {
        let mut qp = url.query_pairs_mut();
        if let Some(fd) = self.filing_lookback_days {
            qp.append_pair("fd", &fd.to_string());
        }
        if let Some(td) = self.trade_lookback_days {
            qp.append_pair("td", &td.to_string());
        }
        for (k, v) in &self.params {
            qp.append_pair(k, v);
        }
    }
}

/// Builder for a paginated screener fetch.
pub struct ScreenerBuilder {
    client: IrClient,
    listing: Option<Url>,
    query: ScreenerQuery,
    pages: usize,
    page_delay: Duration,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
    cancel: Option<CancelToken>,
    source: Option<Arc<dyn PageSource>>,
}

impl ScreenerBuilder {
    /// Start a fetch against the client's screener base URL.
    #[must_use]
    pub fn new(client: &IrClient) -> Self {
        Self {
            client: client.clone(),
            listing: None,
            query: ScreenerQuery::default(),
            pages: 1,
            page_delay: Duration::from_millis(700),
            cache_mode: CacheMode::Use,
            retry_override: None,
            cancel: None,
            source: None,
        }
    }

    /// Page through a specific listing URL (query string kept) instead of the
    /// client's screener base.
    #[must_use]
    pub fn listing_url(mut self, url: Url) -> Self {
        self.listing = Some(url);
        self
    }

    /// Replace the structured query applied to the listing URL.
    #[must_use]
    pub fn query(mut self, query: ScreenerQuery) -> Self {
        self.query = query;
        self
    }

    /// Append one pass-through query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.params.push((key.into(), value.into()));
        self
    }

    /// How many logical pages to request. Default: 1.
    #[must_use]
    pub const fn pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }

    /// Minimum gap between consecutive page requests. Default: 700 ms.
    /// Never applied after the last request.
    #[must_use]
    pub const fn page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Sets the cache mode for this fetch.
    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Overrides the default retry policy for this fetch.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Attach a cancellation token checked between page requests.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Swap in an alternative page retrieval backend.
    #[must_use]
    pub fn page_source(mut self, source: Arc<dyn PageSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Executes the paginated fetch.
    ///
    /// # Errors
    ///
    /// Fails with [`IrError::SourceUnavailable`] when the very first page
    /// cannot be retrieved. Failures on later pages end pagination and are
    /// reported through [`FetchOutcome::stopped_early`] instead; an empty or
    /// unrecognizable page likewise ends pagination without an error.
    #[tracing::instrument(skip(self), err, fields(pages = self.pages))]
    pub async fn fetch(self) -> Result<FetchOutcome, IrError> {
        let listing = self.resolve_listing();

        let built_in;
        let source: &dyn PageSource = match &self.source {
            Some(s) => s.as_ref(),
            None => {
                built_in = HttpPageSource {
                    client: self.client.clone(),
                    cache_mode: self.cache_mode,
                    retry: self.retry_override.clone(),
                };
                &built_in
            }
        };

        let mut rows: Vec<RawRow> = Vec::new();
        let mut pages_fetched = 0usize;
        let mut stopped_early = None;

        for page in 1..=self.pages {
            if let Some(token) = &self.cancel
                && token.is_cancelled()
            {
                tracing::debug!(page, "fetch cancelled");
                stopped_early = Some(StopReason::Cancelled);
                break;
            }
            if page > 1 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let url = page_url(&listing, page);
            let body = match source.fetch_page(&url).await {
                Ok(body) => body,
                Err(e) if page == 1 => {
                    return Err(IrError::SourceUnavailable(format!("{url}: {e}")));
                }
                Err(e) => {
                    tracing::warn!(page, error = %e, "page fetch failed; keeping earlier pages");
                    stopped_early = Some(StopReason::PageFailure { page });
                    break;
                }
            };

            let page_rows = table::parse_listing(&body);
            if page_rows.is_empty() {
                tracing::debug!(page, "no table rows; listing exhausted");
                stopped_early = Some(StopReason::Exhausted);
                break;
            }

            pages_fetched += 1;
            rows.extend(page_rows);
        }

        tracing::debug!(rows = rows.len(), pages_fetched, "screener fetch done");
        Ok(FetchOutcome {
            rows,
            pages_fetched,
            stopped_early,
        })
    }

    fn resolve_listing(&self) -> Url {
        let mut url = self
            .listing
            .clone()
            .unwrap_or_else(|| self.client.base_screener().clone());
        self.query.apply(&mut url);
        url
    }
}

/// Set the page parameter on a listing URL.
///
/// The source accepts both `p=N` and `page=N`; a URL already using `p` keeps
/// it, anything else gets `page` (and a stray `p` is dropped so the two never
/// conflict).
fn page_url(listing: &Url, page: usize) -> Url {
    let pairs: Vec<(String, String)> = listing
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let has_p = pairs.iter().any(|(k, _)| k == "p");
    let has_page = pairs.iter().any(|(k, _)| k == "page");
    let param = if has_p && !has_page { "p" } else { "page" };

    let mut url = listing.clone();
    url.set_query(None);
    {
        let mut qp = url.query_pairs_mut();
        for (k, v) in &pairs {
            if k == "p" || k == "page" {
                continue;
            }
            qp.append_pair(k, v);
        }
        qp.append_pair(param, &page.to_string());
    }
    url
}

struct HttpPageSource {
    client: IrClient,
    cache_mode: CacheMode,
    retry: Option<RetryConfig>,
}

impl PageSource for HttpPageSource {
    fn fetch_page<'a>(
        &'a self,
        url: &'a Url,
    ) -> core::pin::Pin<Box<dyn core::future::Future<Output = Result<String, IrError>> + Send + 'a>>
    {
        Box::pin(async move {
            api::fetch_listing_page(&self.client, url, self.cache_mode, self.retry.as_ref()).await
        })
    }
}

impl PageSource for IrClient {
    fn fetch_page<'a>(
        &'a self,
        url: &'a Url,
    ) -> core::pin::Pin<Box<dyn core::future::Future<Output = Result<String, IrError>> + Send + 'a>>
    {
        Box::pin(async move { api::fetch_listing_page(self, url, CacheMode::Use, None).await })
    }
}
