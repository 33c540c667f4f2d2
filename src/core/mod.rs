//! Core components of the `insider-rank` engine.
//!
//! This module contains the foundational building blocks of the crate, including:
//! - The main [`IrClient`] and its builder.
//! - The primary [`IrError`] type.
//! - Shared data models like [`Transaction`] and [`RollupRecord`].
//! - The trait seams ([`PageSource`], [`QuoteLookup`]) behind which the
//!   external sources sit.

/// Cooperative cancellation for long-running stages.
pub mod cancel;
/// The main client (`IrClient`), builder, and configuration.
pub mod client;
/// The primary error type (`IrError`) for the crate.
pub mod error;
/// Shared data models used across the pipeline stages.
pub mod models;
pub(crate) mod quotes;
/// Service traits for abstracting page retrieval and market lookups.
pub mod services;

// convenient re-exports so most code can just `use crate::core::IrClient`
pub use cancel::CancelToken;
pub use client::{IrClient, IrClientBuilder};
pub use error::IrError;
pub use models::{
    Column, EnrichedRecord, EnrichmentStatus, InsiderTitle, MarketSnapshot, RawRow, RollupRecord,
    ScreenRecord, TradeAction, Transaction,
};
pub use services::{PageSource, QuoteLookup};
