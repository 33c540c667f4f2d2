//! insider-rank: screening and ranking of insider stock transactions.
//!
//! Pulls the OpenInsider screener listing, normalizes it into typed
//! transactions, optionally rolls them up per ticker, enriches each record
//! with current market data, and ranks everything under a configurable
//! weight profile.

pub mod core;
pub mod enrich;
pub mod normalize;
pub mod pipeline;
pub mod rollup;
pub mod scoring;
pub mod screener;

pub use crate::core::client::{Backoff, CacheMode, RetryConfig};
pub use crate::core::{
    CancelToken, Column, EnrichedRecord, EnrichmentStatus, InsiderTitle, IrClient, IrClientBuilder,
    IrError, MarketSnapshot, PageSource, QuoteLookup, RawRow, RollupRecord, ScreenRecord,
    TradeAction, Transaction,
};
pub use enrich::{EnrichBuilder, EnrichOutcome};
pub use normalize::{DropCounts, NormalizeOutcome, normalize};
pub use pipeline::{PipelineBuilder, RunReport};
pub use rollup::{RollupConfig, aggregate};
pub use scoring::{Factor, ScoredResult, WeightProfile, score};
pub use screener::{FetchOutcome, ScreenerBuilder, ScreenerQuery, StopReason};
