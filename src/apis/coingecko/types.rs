use serde::Deserialize;

/// Row of `/coins/markets`
///
/// CoinGecko returns `null` for any numeric field it has no data for.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinGeckoMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    /// Present when requested with `price_change_percentage=1h`
    #[serde(default)]
    pub price_change_percentage_1h_in_currency: Option<f64>,
}
