/// DexScreener API client
///
/// API Documentation: https://docs.dexscreener.com/api/reference
///
/// Endpoints implemented:
/// 1. /latest/dex/tokens/{tokenAddresses} - Pairs for up to 30 tokens (leaderboard fallback)
pub mod types;

pub use self::types::{DexScreenerPair, PairToken, PairsResponse, WindowStats};

use super::client::HttpClient;
use crate::errors::ApiError;

// ============================================================================
// API CONFIGURATION
// ============================================================================

const DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com";

/// Maximum tokens per batch request
pub const MAX_TOKENS_PER_REQUEST: usize = 30;

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

pub struct DexScreenerClient {
    http: HttpClient,
}

impl DexScreenerClient {
    pub fn new(timeout_secs: u64, rate_limit_per_minute: usize) -> Result<Self, String> {
        Ok(Self {
            http: HttpClient::new("DexScreener", timeout_secs, rate_limit_per_minute)?,
        })
    }

    /// All pairs for the given token addresses across every chain
    pub async fn fetch_token_pairs(
        &self,
        addresses: &[&str],
    ) -> Result<Vec<DexScreenerPair>, ApiError> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        if addresses.len() > MAX_TOKENS_PER_REQUEST {
            return Err(ApiError::InvalidResponse(format!(
                "too many tokens in one request: {} (max {})",
                addresses.len(),
                MAX_TOKENS_PER_REQUEST
            )));
        }

        let url = format!(
            "{}/latest/dex/tokens/{}",
            DEXSCREENER_BASE_URL,
            addresses.join(",")
        );
        let response: PairsResponse = self.http.get_json(&url).await?;
        Ok(response.pairs.unwrap_or_default())
    }
}
