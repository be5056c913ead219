/// CoinGecko API client
///
/// API Documentation: https://docs.coingecko.com/reference/introduction
///
/// Endpoints implemented:
/// 1. /simple/price - Native asset USD price (swap pricing)
/// 2. /coins/markets - Base ecosystem tokens by volume (leaderboards)
pub mod types;

pub use self::types::CoinGeckoMarket;

use super::client::HttpClient;
use super::PriceOracle;
use crate::errors::ApiError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use serde_json::Value;

// ============================================================================
// API CONFIGURATION
// ============================================================================

const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Market category listing Base chain tokens
const BASE_ECOSYSTEM_CATEGORY: &str = "base-ecosystem";

/// CoinGecko caps `per_page` at 250
const MAX_PER_PAGE: usize = 250;

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

pub struct CoinGeckoClient {
    http: HttpClient,
    base_url: String,
    /// CoinGecko id of the native asset (`ethereum` on Base)
    native_asset_id: String,
}

impl CoinGeckoClient {
    pub fn new(
        native_asset_id: &str,
        timeout_secs: u64,
        rate_limit_per_minute: usize,
    ) -> Result<Self, String> {
        Ok(Self {
            http: HttpClient::new("CoinGecko", timeout_secs, rate_limit_per_minute)?,
            base_url: COINGECKO_BASE_URL.to_string(),
            native_asset_id: native_asset_id.to_string(),
        })
    }

    /// Current USD price of the native asset
    ///
    /// Fails on non-2xx, malformed payloads, and prices that are missing,
    /// non-finite or not positive.
    pub async fn fetch_native_price_usd(&self) -> Result<f64, ApiError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url, self.native_asset_id
        );
        let body: Value = self.http.get_json(&url).await?;
        let price = extract_usd_price(&body, &self.native_asset_id)?;

        logger::debug(
            LogTag::Api,
            &format!("{} price: ${:.2}", self.native_asset_id, price),
        );
        Ok(price)
    }

    /// Top Base ecosystem tokens ordered by 24h volume
    pub async fn fetch_base_markets(&self, limit: usize) -> Result<Vec<CoinGeckoMarket>, ApiError> {
        let per_page = limit.clamp(1, MAX_PER_PAGE);
        let url = format!(
            "{}/coins/markets?vs_currency=usd&category={}&order=volume_desc&per_page={}&page=1&sparkline=false&price_change_percentage=1h,24h",
            self.base_url, BASE_ECOSYSTEM_CATEGORY, per_page
        );
        self.http.get_json(&url).await
    }
}

#[async_trait]
impl PriceOracle for CoinGeckoClient {
    async fn native_price_usd(&self) -> Result<f64, ApiError> {
        self.fetch_native_price_usd().await
    }
}

/// Pull `<asset>.usd` out of a `/simple/price` payload
pub fn extract_usd_price(body: &Value, asset_id: &str) -> Result<f64, ApiError> {
    let raw = body
        .get(asset_id)
        .and_then(|asset| asset.get("usd"))
        .ok_or_else(|| ApiError::InvalidResponse(format!("missing {}.usd", asset_id)))?;

    let price = raw
        .as_f64()
        .ok_or_else(|| ApiError::InvalidResponse(format!("{}.usd is not a number", asset_id)))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(ApiError::InvalidResponse(format!(
            "implausible {} price: {}",
            asset_id, price
        )));
    }

    Ok(price)
}
