use crate::core::{IrError, MarketSnapshot};
use url::Url;

/// A trait for backends that can retrieve one page of the screener listing.
///
/// This decouples pagination and table parsing from the concrete HTML
/// retrieval mechanism. It is implemented by [`IrClient`](crate::IrClient)
/// over plain HTTP; a browser-automation backend can stand in without
/// touching the rest of the screener.
pub trait PageSource: Send + Sync {
    /// Asynchronously fetches the HTML body of `url`.
    ///
    /// # Returns
    /// A `Future` that resolves to the page body on success or an `IrError`
    /// on failure. Status-code mapping (404/429/5xx) is the implementor's
    /// responsibility.
    fn fetch_page<'a>(
        &'a self,
        url: &'a Url,
    ) -> core::pin::Pin<Box<dyn core::future::Future<Output = Result<String, IrError>> + Send + 'a>>;
}

/// A trait for services that can resolve current market data for a ticker.
///
/// Implemented by [`IrClient`](crate::IrClient) against the quote API; tests
/// and alternative data vendors supply their own implementations.
pub trait QuoteLookup: Send + Sync {
    /// Asynchronously looks up the market snapshot for `ticker`.
    ///
    /// # Returns
    /// A `Future` that resolves to a [`MarketSnapshot`] on success or an
    /// `IrError` on failure. An unknown symbol must surface as
    /// [`IrError::NotFound`] so enrichment can classify it.
    fn lookup<'a>(
        &'a self,
        ticker: &'a str,
    ) -> core::pin::Pin<
        Box<dyn core::future::Future<Output = Result<MarketSnapshot, IrError>> + Send + 'a>,
    >;
}
