//! Client surface and builder.
//! Internals are split into `retry` (policy + send loop) and `constants` (UA + defaults).

mod constants;
mod retry;

use crate::core::IrError;
use constants::{DEFAULT_BASE_QUOTE, DEFAULT_BASE_SCREENER, USER_AGENT};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use url::Url;

pub use retry::{Backoff, CacheMode, RetryConfig};

#[derive(Debug)]
struct CachedBody {
    text: String,
    fresh_until: Instant,
}

/// Response cache keyed by full request URL.
#[derive(Debug)]
struct ResponseCache {
    entries: RwLock<HashMap<String, CachedBody>>,
    ttl: Duration,
}

/// Shared HTTP client for the screener and quote endpoints.
///
/// Cloning is cheap; all clones share the same connection pool and response cache.
#[derive(Debug, Clone)]
pub struct IrClient {
    http: Client,
    base_screener: Url,
    base_quote: Url,
    retry: RetryConfig,
    cache: Option<Arc<ResponseCache>>,
}

impl Default for IrClient {
    fn default() -> Self {
        Self::builder().build().expect("default client")
    }
}

impl IrClient {
    /// Create a new builder.
    pub fn builder() -> IrClientBuilder {
        IrClientBuilder::default()
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
    pub(crate) fn base_screener(&self) -> &Url {
        &self.base_screener
    }
    pub(crate) fn base_quote(&self) -> &Url {
        &self.base_quote
    }
    pub(crate) fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub(crate) async fn cache_get(&self, url: &Url) -> Option<String> {
        let cache = self.cache.as_ref()?;
        let entries = cache.entries.read().await;
        entries
            .get(url.as_str())
            .filter(|e| Instant::now() <= e.fresh_until)
            .map(|e| e.text.clone())
    }

    pub(crate) async fn cache_put(&self, url: &Url, body: &str, ttl_override: Option<Duration>) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        let entry = CachedBody {
            text: body.to_string(),
            fresh_until: Instant::now() + ttl_override.unwrap_or(cache.ttl),
        };
        cache
            .entries
            .write()
            .await
            .insert(url.as_str().to_string(), entry);
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct IrClientBuilder {
    user_agent: Option<String>,
    base_screener: Option<Url>,
    base_quote: Option<Url>,
    retry: Option<RetryConfig>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    cache_ttl: Option<Duration>,
}

impl IrClientBuilder {
    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the screener base (e.g., `http://openinsider.com/screener`).
    #[must_use]
    pub fn base_screener(mut self, url: Url) -> Self {
        self.base_screener = Some(url);
        self
    }

    /// Override the quote API base (e.g., `https://query1.finance.yahoo.com/v7/finance/quote`).
    #[must_use]
    pub fn base_quote(mut self, url: Url) -> Self {
        self.base_quote = Some(url);
        self
    }

    /// Set the default retry policy for all requests made through this client.
    /// Individual calls can still override it.
    #[must_use]
    pub fn retry_policy(mut self, cfg: RetryConfig) -> Self {
        self.retry = Some(cfg);
        self
    }

    /// Overall request timeout. Unset by default.
    #[must_use]
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Connection timeout. Unset by default.
    #[must_use]
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Turn on the in-memory response cache with this default TTL.
    /// Without it, every call goes to the network.
    #[must_use]
    pub fn cache_ttl(mut self, dur: Duration) -> Self {
        self.cache_ttl = Some(dur);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if a base URL override fails to parse or the underlying
    /// HTTP client cannot be constructed.
    pub fn build(self) -> Result<IrClient, IrError> {
        let base_screener = match self.base_screener {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_SCREENER)?,
        };
        let base_quote = match self.base_quote {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_QUOTE)?,
        };

        let mut httpb = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .cookie_store(true);

        if let Some(t) = self.timeout {
            httpb = httpb.timeout(t);
        }
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }

        let http = httpb.build()?;

        Ok(IrClient {
            http,
            base_screener,
            base_quote,
            retry: self.retry.unwrap_or_default(),
            cache: self.cache_ttl.map(|ttl| {
                Arc::new(ResponseCache {
                    entries: RwLock::new(HashMap::new()),
                    ttl,
                })
            }),
        })
    }
}
