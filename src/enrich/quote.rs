use crate::core::client::CacheMode;
use crate::core::{IrClient, IrError, MarketSnapshot, QuoteLookup, quotes};

impl QuoteLookup for IrClient {
    fn lookup<'a>(
        &'a self,
        ticker: &'a str,
    ) -> core::pin::Pin<
        Box<dyn core::future::Future<Output = Result<MarketSnapshot, IrError>> + Send + 'a>,
    > {
        Box::pin(quotes::fetch_snapshot(self, ticker, CacheMode::Use, None))
    }
}
