use serde::Deserialize;

/// Response of `/latest/dex/tokens/{addresses}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairsResponse {
    #[serde(default)]
    pub pairs: Option<Vec<DexScreenerPair>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexScreenerPair {
    pub chain_id: String,
    #[serde(default)]
    pub pair_address: Option<String>,
    pub base_token: PairToken,
    /// USD price as a decimal string
    #[serde(default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub volume: Option<WindowStats>,
    #[serde(default)]
    pub price_change: Option<WindowStats>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
}

/// Per-window figures (`m5`, `h1`, `h6`, `h24`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowStats {
    #[serde(default)]
    pub m5: Option<f64>,
    #[serde(default)]
    pub h1: Option<f64>,
    #[serde(default)]
    pub h6: Option<f64>,
    #[serde(default)]
    pub h24: Option<f64>,
}

impl DexScreenerPair {
    pub fn price_usd_f64(&self) -> f64 {
        self.price_usd
            .as_deref()
            .and_then(|raw| raw.parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    pub fn volume_h24(&self) -> f64 {
        self.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0)
    }
}
