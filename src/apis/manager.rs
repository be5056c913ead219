/// API manager - owns one instance of each market API client
///
/// Built once at startup from settings and shared through `Arc` with the
/// handlers that need it.
use std::sync::Arc;

use super::coingecko::CoinGeckoClient;
use super::dexscreener::DexScreenerClient;
use super::geckoterminal::GeckoTerminalClient;
use crate::config::Settings;
use crate::logger::{self, LogTag};

pub struct ApiManager {
    pub coingecko: Arc<CoinGeckoClient>,
    pub dexscreener: Arc<DexScreenerClient>,
    pub geckoterminal: Arc<GeckoTerminalClient>,
}

impl ApiManager {
    pub fn new(settings: &Settings) -> Result<Self, String> {
        let apis = &settings.apis;
        let chain = &settings.chain;

        logger::info(LogTag::Api, "Initializing API clients");

        Ok(Self {
            coingecko: Arc::new(CoinGeckoClient::new(
                &chain.native_asset_id,
                apis.coingecko_timeout_secs,
                apis.coingecko_rate_limit_per_minute,
            )?),
            dexscreener: Arc::new(DexScreenerClient::new(
                apis.dexscreener_timeout_secs,
                apis.dexscreener_rate_limit_per_minute,
            )?),
            geckoterminal: Arc::new(GeckoTerminalClient::new(
                &chain.network,
                apis.geckoterminal_timeout_secs,
                apis.geckoterminal_rate_limit_per_minute,
            )?),
        })
    }
}
