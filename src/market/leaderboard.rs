use super::{TimeFrame, TokenData, TokenSource};
use crate::apis::coingecko::CoinGeckoMarket;
use crate::apis::dexscreener::DexScreenerPair;
use crate::apis::ApiManager;
use crate::errors::ApiError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Well-known Base tokens queried on DexScreener when CoinGecko is unavailable
pub const FALLBACK_BASE_TOKENS: [&str; 5] = [
    "0x4200000000000000000000000000000000000006", // WETH
    "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913", // USDC
    "0x50c5725949A6F0c72E6C4a641F24049A917DB0Cb", // DAI
    "0x2Ae3F1Ec7F1F5012CFEab0185bfc7aa3cf0DEc22", // cbETH
    "0xd9aAEc86B65D86f6A7B5B1b0c42FFA531710b6CA", // USDbC
];

/// Rows returned by the fallback source
pub const FALLBACK_LIMIT: usize = 5;

/// Top Base tokens by volume, CoinGecko first and DexScreener as fallback
pub async fn fetch_top_tokens(
    apis: &ApiManager,
    network: &str,
    limit: usize,
) -> Result<Vec<TokenData>, ApiError> {
    match apis.coingecko.fetch_base_markets(limit).await {
        Ok(rows) if !rows.is_empty() => return Ok(tokens_from_markets(&rows, limit)),
        Ok(_) => logger::warning(LogTag::Market, "CoinGecko returned no Base markets, using fallback"),
        Err(e) => logger::warning(
            LogTag::Market,
            &format!("CoinGecko markets failed ({}), using fallback", e),
        ),
    }

    let pairs = apis
        .dexscreener
        .fetch_token_pairs(&FALLBACK_BASE_TOKENS)
        .await
        .map_err(|e| {
            logger::error(LogTag::Market, &format!("DexScreener fallback failed: {}", e));
            e
        })?;

    let tokens = tokens_from_pairs(&pairs, network, FALLBACK_LIMIT);
    if tokens.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(tokens)
}

/// Live [`TokenSource`] backed by the market API clients
pub struct MarketService {
    apis: Arc<ApiManager>,
    network: String,
}

impl MarketService {
    pub fn new(apis: Arc<ApiManager>, network: &str) -> Self {
        Self {
            apis,
            network: network.to_string(),
        }
    }
}

#[async_trait]
impl TokenSource for MarketService {
    async fn top_tokens(&self, limit: usize) -> Result<Vec<TokenData>, ApiError> {
        fetch_top_tokens(&self.apis, &self.network, limit).await
    }
}

pub fn tokens_from_markets(rows: &[CoinGeckoMarket], limit: usize) -> Vec<TokenData> {
    rows.iter()
        .take(limit)
        .map(|row| TokenData {
            symbol: row.symbol.to_uppercase(),
            name: row.name.clone(),
            contract_address: None,
            price_usd: row.current_price.unwrap_or(0.0),
            volume_24h: row.total_volume.unwrap_or(0.0),
            price_change_1h: row.price_change_percentage_1h_in_currency,
            price_change_6h: None,
            price_change_24h: row.price_change_percentage_24h.unwrap_or(0.0),
        })
        .collect()
}

/// Keep the highest-volume pair per symbol on `network`, sorted by volume
pub fn tokens_from_pairs(pairs: &[DexScreenerPair], network: &str, limit: usize) -> Vec<TokenData> {
    let mut by_symbol: HashMap<String, TokenData> = HashMap::new();

    for pair in pairs.iter().filter(|p| p.chain_id == network) {
        let volume = pair.volume_h24();
        let replace = by_symbol
            .get(&pair.base_token.symbol)
            .map_or(true, |existing| volume > existing.volume_24h);
        if !replace {
            continue;
        }

        let change = pair.price_change.clone().unwrap_or_default();
        by_symbol.insert(
            pair.base_token.symbol.clone(),
            TokenData {
                symbol: pair.base_token.symbol.clone(),
                name: pair.base_token.name.clone(),
                contract_address: Some(pair.base_token.address.to_lowercase()),
                price_usd: pair.price_usd_f64(),
                volume_24h: volume,
                price_change_1h: change.h1,
                price_change_6h: change.h6,
                price_change_24h: change.h24.unwrap_or(0.0),
            },
        );
    }

    let mut tokens: Vec<TokenData> = by_symbol.into_values().collect();
    tokens.sort_by(|a, b| b.volume_24h.total_cmp(&a.volume_24h));
    tokens.truncate(limit);
    tokens
}

/// Order rows for a leaderboard window
///
/// 24h keeps volume order; shorter windows rank by that window's price change.
pub fn sort_by_time_frame(mut tokens: Vec<TokenData>, time_frame: TimeFrame) -> Vec<TokenData> {
    match time_frame {
        TimeFrame::H24 => tokens.sort_by(|a, b| b.volume_24h.total_cmp(&a.volume_24h)),
        TimeFrame::H1 | TimeFrame::H6 => tokens.sort_by(|a, b| {
            time_frame
                .change_for(b)
                .total_cmp(&time_frame.change_for(a))
        }),
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(symbol: &str, volume: f64, h1: Option<f64>, h24: f64) -> TokenData {
        TokenData {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            contract_address: None,
            price_usd: 1.0,
            volume_24h: volume,
            price_change_1h: h1,
            price_change_6h: None,
            price_change_24h: h24,
        }
    }

    #[test]
    fn test_markets_are_normalized() {
        let rows: Vec<CoinGeckoMarket> = serde_json::from_value(json!([
            { "id": "a", "symbol": "aero", "name": "Aerodrome", "current_price": 1.2, "total_volume": 10.0, "price_change_percentage_24h": 3.0 },
            { "id": "b", "symbol": "brett", "name": "Brett", "current_price": null, "total_volume": null, "price_change_percentage_24h": null },
            { "id": "c", "symbol": "toshi", "name": "Toshi", "current_price": 0.001, "total_volume": 5.0, "price_change_percentage_24h": 1.0 }
        ]))
        .unwrap();

        let tokens = tokens_from_markets(&rows, 2);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].symbol, "AERO");
        assert_eq!(tokens[1].price_usd, 0.0);
        assert_eq!(tokens[1].price_change_24h, 0.0);
    }

    #[test]
    fn test_pairs_keep_best_volume_per_symbol() {
        let pairs: Vec<DexScreenerPair> = serde_json::from_value(json!([
            { "chainId": "base", "baseToken": { "address": "0xAAA", "name": "Wrapped Ether", "symbol": "WETH" }, "priceUsd": "3000", "volume": { "h24": 100.0 } },
            { "chainId": "base", "baseToken": { "address": "0xAAA", "name": "Wrapped Ether", "symbol": "WETH" }, "priceUsd": "3001", "volume": { "h24": 900.0 }, "priceChange": { "h1": 0.5, "h24": 2.0 } },
            { "chainId": "ethereum", "baseToken": { "address": "0xBBB", "name": "Dai", "symbol": "DAI" }, "priceUsd": "1", "volume": { "h24": 99999.0 } },
            { "chainId": "base", "baseToken": { "address": "0xCCC", "name": "USD Coin", "symbol": "USDC" }, "priceUsd": "1", "volume": { "h24": 500.0 } }
        ]))
        .unwrap();

        let tokens = tokens_from_pairs(&pairs, "base", 5);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].symbol, "WETH");
        assert_eq!(tokens[0].price_usd, 3001.0);
        assert_eq!(tokens[0].price_change_1h, Some(0.5));
        assert_eq!(tokens[0].contract_address.as_deref(), Some("0xaaa"));
        assert_eq!(tokens[1].symbol, "USDC");
    }

    #[test]
    fn test_sort_by_time_frame() {
        let tokens = vec![
            token("LOW", 10.0, Some(9.0), 1.0),
            token("HIGH", 100.0, Some(-2.0), 5.0),
            token("MID", 50.0, None, 20.0),
        ];

        let by_volume: Vec<String> = sort_by_time_frame(tokens.clone(), TimeFrame::H24)
            .into_iter()
            .map(|t| t.symbol)
            .collect();
        assert_eq!(by_volume, vec!["HIGH", "MID", "LOW"]);

        // MID has no 1h figure and ranks by its 24h change
        let by_hour: Vec<String> = sort_by_time_frame(tokens, TimeFrame::H1)
            .into_iter()
            .map(|t| t.symbol)
            .collect();
        assert_eq!(by_hour, vec!["MID", "LOW", "HIGH"]);
    }
}
