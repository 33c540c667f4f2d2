//! Network retrieval of listing pages.

use crate::{
    IrClient, IrError,
    core::client::{CacheMode, RetryConfig},
};
use url::Url;

/// Fetch one listing page as HTML, honoring the client cache and retry policy.
pub(crate) async fn fetch_listing_page(
    client: &IrClient,
    url: &Url,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
) -> Result<String, IrError> {
    if cache_mode == CacheMode::Use
        && let Some(body) = client.cache_get(url).await
    {
        return Ok(body);
    }

    let resp = client
        .send_with_retry(client.http().get(url.clone()), retry_override)
        .await?;

    let status = resp.status();
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

    let body = resp.text().await?;
    if cache_mode != CacheMode::Bypass {
        client.cache_put(url, &body, None).await;
    }
    Ok(body)
}
