//! Network capabilities the ticker depends on.
//!
//! Responsibilities:
//! • Open the per-symbol mark-price stream and yield its raw text frames.
//! • Fetch a one-shot premium index snapshot for the same symbol.
//!
//! Both sit behind traits so the ticker loop can be driven by test doubles.

use crate::errors::Result;
use crate::models::PremiumIndex;
use async_trait::async_trait;
use futures::stream::BoxStream;

pub mod binance;
pub mod rest;

pub use binance::BinanceMarkPriceFeed;
pub use rest::BinancePremiumIndex;

/// Raw text frames from an open stream. The stream ending means the
/// connection closed; an `Err` item is a transport error on a live stream.
pub type FeedStream = BoxStream<'static, Result<String>>;

#[async_trait]
pub trait MarkPriceFeed: Send + Sync {
    async fn connect(&self, symbol: &str) -> Result<FeedStream>;
}

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<PremiumIndex>;
}
