//! Token leaderboards for the slash commands

pub mod formatter;
pub mod leaderboard;

pub use formatter::{format_leaderboard, format_single_token};
pub use leaderboard::{fetch_top_tokens, sort_by_time_frame, MarketService};

use crate::errors::ApiError;
use async_trait::async_trait;

/// Source of leaderboard rows, ordered by 24h volume
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn top_tokens(&self, limit: usize) -> Result<Vec<TokenData>, ApiError>;
}

/// One leaderboard row, normalized across market sources
#[derive(Debug, Clone, PartialEq)]
pub struct TokenData {
    pub symbol: String,
    pub name: String,
    /// Known only when the row came from a DEX source
    pub contract_address: Option<String>,
    pub price_usd: f64,
    pub volume_24h: f64,
    pub price_change_1h: Option<f64>,
    pub price_change_6h: Option<f64>,
    pub price_change_24h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFrame {
    H1,
    H6,
    H24,
}

impl TimeFrame {
    pub fn label(&self) -> &'static str {
        match self {
            TimeFrame::H1 => "1h",
            TimeFrame::H6 => "6h",
            TimeFrame::H24 => "24h",
        }
    }

    /// Price change for this window, falling back to the 24h change
    pub fn change_for(&self, token: &TokenData) -> f64 {
        match self {
            TimeFrame::H1 => token.price_change_1h.unwrap_or(token.price_change_24h),
            TimeFrame::H6 => token.price_change_6h.unwrap_or(token.price_change_24h),
            TimeFrame::H24 => token.price_change_24h,
        }
    }
}
