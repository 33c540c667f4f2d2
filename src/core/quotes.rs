use serde::Deserialize;

use crate::{
    IrClient, IrError,
    core::{
        MarketSnapshot,
        client::{CacheMode, RetryConfig},
    },
};

// Wire shapes for the v7 quote endpoint.
#[derive(Deserialize)]
pub struct V7Envelope {
    #[serde(rename = "quoteResponse")]
    pub(crate) quote_response: Option<V7QuoteResponse>,
}

#[derive(Deserialize)]
pub struct V7QuoteResponse {
    pub(crate) result: Option<Vec<V7QuoteNode>>,
    #[allow(dead_code)]
    pub(crate) error: Option<serde_json::Value>,
}

#[derive(Deserialize, Clone)]
pub struct V7QuoteNode {
    #[allow(dead_code)]
    #[serde(default)]
    pub(crate) symbol: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    pub(crate) regular_market_price: Option<f64>,
    #[serde(rename = "marketCap")]
    pub(crate) market_cap: Option<f64>,
}

/// Fetch quotes for one or more symbols, honoring the cache and retry
/// policy. Non-success statuses map to their specific error variants.
pub(crate) async fn fetch_v7_quotes(
    client: &IrClient,
    symbols: &[&str],
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<Vec<V7QuoteNode>, IrError> {
    let mut url = client.base_quote().clone();
    url.query_pairs_mut()
        .append_pair("symbols", &symbols.join(","));

    if cache_mode == CacheMode::Use
        && let Some(body) = client.cache_get(&url).await
    {
        let env: V7Envelope = serde_json::from_str(&body)?;
        return Ok(env
            .quote_response
            .and_then(|qr| qr.result)
            .unwrap_or_default());
    }

    let resp = client
        .send_with_retry(
            client
                .http()
                .get(url.clone())
                .header("accept", "application/json"),
            retry_override,
        )
        .await?;

    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        let url_s = url.to_string();
        return Err(match status.as_u16() {
            404 => IrError::NotFound { url: url_s },
            429 => IrError::RateLimited { url: url_s },
            code @ 500..=599 => IrError::ServerError {
                status: code,
                url: url_s,
            },
            code => IrError::Status {
                status: code,
                url: url_s,
            },
        });
    }

    if cache_mode != CacheMode::Bypass {
        client.cache_put(&url, &body, None).await;
    }

    let env: V7Envelope = serde_json::from_str(&body)?;
    Ok(env
        .quote_response
        .and_then(|qr| qr.result)
        .unwrap_or_default())
}

/// Resolve a single ticker to a [`MarketSnapshot`].
///
/// An empty `result` array means the source does not know the symbol and maps
/// to [`IrError::NotFound`].
pub(crate) async fn fetch_snapshot(
    client: &IrClient,
    ticker: &str,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<MarketSnapshot, IrError> {
    let nodes = fetch_v7_quotes(client, &[ticker], cache_mode, retry_override).await?;
    match nodes.into_iter().next() {
        Some(n) => Ok(MarketSnapshot {
            market_cap: n.market_cap,
            current_price: n.regular_market_price,
        }),
        None => {
            let mut url = client.base_quote().clone();
            url.query_pairs_mut().append_pair("symbols", ticker);
            Err(IrError::NotFound {
                url: url.to_string(),
            })
        }
    }
}
