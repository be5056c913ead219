/// GeckoTerminal API client
///
/// API Documentation: https://www.geckoterminal.com/dex-api
///
/// Endpoints implemented:
/// 1. /networks/{network}/tokens/{address} - Token metadata (symbol, name)
pub mod types;

pub use self::types::{
    GeckoTerminalToken, GeckoTerminalTokenAttributes, GeckoTerminalTokenResponse,
};

use super::client::HttpClient;
use super::{TokenInfo, TokenInfoLookup};
use crate::errors::ApiError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;

// ============================================================================
// API CONFIGURATION
// ============================================================================

const GECKOTERMINAL_BASE_URL: &str = "https://api.geckoterminal.com/api/v2";

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

pub struct GeckoTerminalClient {
    http: HttpClient,
    base_url: String,
    network: String,
}

impl GeckoTerminalClient {
    pub fn new(network: &str, timeout_secs: u64, rate_limit_per_minute: usize) -> Result<Self, String> {
        Ok(Self {
            http: HttpClient::new("GeckoTerminal", timeout_secs, rate_limit_per_minute)?,
            base_url: GECKOTERMINAL_BASE_URL.to_string(),
            network: network.to_string(),
        })
    }

    /// Raw token metadata for a contract address on the configured network
    pub async fn fetch_token(&self, address: &str) -> Result<GeckoTerminalTokenResponse, ApiError> {
        let url = format!(
            "{}/networks/{}/tokens/{}",
            self.base_url,
            self.network,
            address.to_lowercase()
        );
        self.http.get_json(&url).await
    }
}

#[async_trait]
impl TokenInfoLookup for GeckoTerminalClient {
    async fn token_info(&self, address: &str) -> Option<TokenInfo> {
        match self.fetch_token(address).await {
            Ok(response) => token_info_from_response(&response),
            Err(e) => {
                logger::debug(
                    LogTag::Api,
                    &format!("Token info lookup for {} failed: {}", address, e),
                );
                None
            }
        }
    }
}

/// Both symbol and name must be present and non-empty
pub fn token_info_from_response(response: &GeckoTerminalTokenResponse) -> Option<TokenInfo> {
    let attributes = response.data.as_ref()?.attributes.as_ref()?;
    let symbol = attributes.symbol.as_deref().filter(|s| !s.is_empty())?;
    let name = attributes.name.as_deref().filter(|s| !s.is_empty())?;

    Some(TokenInfo {
        symbol: symbol.to_string(),
        name: name.to_string(),
    })
}
