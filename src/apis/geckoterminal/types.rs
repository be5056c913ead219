use serde::Deserialize;

/// Response of `/networks/{network}/tokens/{address}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeckoTerminalTokenResponse {
    #[serde(default)]
    pub data: Option<GeckoTerminalToken>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeckoTerminalToken {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: Option<GeckoTerminalTokenAttributes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeckoTerminalTokenAttributes {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
}
