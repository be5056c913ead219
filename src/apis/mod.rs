//! Outbound market-data integrations
//!
//! The buy flow only sees two seams, [`PriceOracle`] and [`TokenInfoLookup`];
//! the concrete clients live in the submodules and are owned by [`ApiManager`].

pub mod client;
pub mod coingecko;
pub mod dexscreener;
pub mod geckoterminal;
pub mod manager;

pub use manager::ApiManager;

use crate::errors::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Human-readable token identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
}

/// Current USD price of the chain's native asset
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn native_price_usd(&self) -> Result<f64, ApiError>;
}

/// Best-effort symbol/name resolution; never fails, only misses
#[async_trait]
pub trait TokenInfoLookup: Send + Sync {
    async fn token_info(&self, address: &str) -> Option<TokenInfo>;
}
