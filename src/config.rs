use crate::buy::swap::ChainParams;
use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5123;
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Tunables read from the optional TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bot: BotSettings,
    pub buy: BuySettings,
    pub chain: ChainSettings,
    pub apis: ApiSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Base URL of the Towns bot API used for outbound calls
    pub api_url: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuySettings {
    /// Largest USD amount accepted in a buy request
    pub max_amount_usd: u64,
    /// Unanswered confirmations are dropped after this many seconds
    pub session_ttl_secs: u64,
    pub session_sweep_interval_secs: u64,
    /// Carried on the swap request; the router call still uses amountOutMin = 0
    pub slippage_percent: f64,
    pub deadline_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    pub chain_id: String,
    /// Network slug used by GeckoTerminal and DexScreener
    pub network: String,
    /// CoinGecko id of the native asset
    pub native_asset_id: String,
    pub wrapped_native_address: String,
    pub router_address: String,
    pub explorer_tx_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub coingecko_timeout_secs: u64,
    pub coingecko_rate_limit_per_minute: usize,
    pub geckoterminal_timeout_secs: u64,
    pub geckoterminal_rate_limit_per_minute: usize,
    pub dexscreener_timeout_secs: u64,
    pub dexscreener_rate_limit_per_minute: usize,
    pub towns_timeout_secs: u64,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            api_url: "https://app.towns.com/api/bot".to_string(),
            name: "Base Token Tracker".to_string(),
            description: "Trending Base tokens and guided buys with wallet confirmation"
                .to_string(),
        }
    }
}

impl Default for BuySettings {
    fn default() -> Self {
        Self {
            max_amount_usd: 1_000_000,
            session_ttl_secs: 900, // 15 minutes
            session_sweep_interval_secs: 60,
            slippage_percent: 2.0,
            deadline_secs: 20 * 60,
        }
    }
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            chain_id: "8453".to_string(),
            network: "base".to_string(),
            native_asset_id: "ethereum".to_string(),
            wrapped_native_address: "0x4200000000000000000000000000000000000006".to_string(),
            // Uniswap V2-style router on Base
            router_address: "0x4752ba5dbc23f44d87826276bf6fd6b1c372ad24".to_string(),
            explorer_tx_url: "https://basescan.org/tx/".to_string(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            coingecko_timeout_secs: 5,
            coingecko_rate_limit_per_minute: 30,
            geckoterminal_timeout_secs: 5,
            geckoterminal_rate_limit_per_minute: 30,
            dexscreener_timeout_secs: 10,
            dexscreener_rate_limit_per_minute: 300,
            towns_timeout_secs: 10,
        }
    }
}

impl BuySettings {
    pub fn ceiling(&self) -> Decimal {
        Decimal::from(self.max_amount_usd)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_secs.max(1))
    }
}

impl Settings {
    /// Read settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buy.max_amount_usd == 0 {
            return Err(anyhow!("buy.max_amount_usd must be greater than zero"));
        }
        if self.buy.deadline_secs == 0 {
            return Err(anyhow!("buy.deadline_secs must be greater than zero"));
        }
        if !self.buy.slippage_percent.is_finite() || self.buy.slippage_percent < 0.0 {
            return Err(anyhow!("buy.slippage_percent must be a non-negative number"));
        }
        for (field, value) in [
            ("apis.coingecko_timeout_secs", self.apis.coingecko_timeout_secs),
            ("apis.geckoterminal_timeout_secs", self.apis.geckoterminal_timeout_secs),
            ("apis.dexscreener_timeout_secs", self.apis.dexscreener_timeout_secs),
            ("apis.towns_timeout_secs", self.apis.towns_timeout_secs),
        ] {
            if value == 0 {
                return Err(anyhow!("{} must be greater than zero", field));
            }
        }
        self.chain_params()?;
        Ok(())
    }

    /// Typed chain parameters for the swap builder
    pub fn chain_params(&self) -> Result<ChainParams> {
        let router = self
            .chain
            .router_address
            .parse()
            .with_context(|| format!("Invalid chain.router_address '{}'", self.chain.router_address))?;
        let wrapped_native = self.chain.wrapped_native_address.parse().with_context(|| {
            format!(
                "Invalid chain.wrapped_native_address '{}'",
                self.chain.wrapped_native_address
            )
        })?;

        Ok(ChainParams {
            chain_id: self.chain.chain_id.clone(),
            router,
            wrapped_native,
            deadline_secs: self.buy.deadline_secs,
        })
    }
}

/// Full runtime configuration: secrets from the environment plus settings
#[derive(Clone)]
pub struct Config {
    /// Bot application credential (APP_PRIVATE_DATA)
    pub app_private_data: String,
    /// Webhook signing secret (JWT_SECRET)
    pub jwt_secret: String,
    pub port: u16,
    pub settings: Settings,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_private_data", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("port", &self.port)
            .field("settings", &self.settings)
            .finish()
    }
}

impl Config {
    /// Load configuration for the running process
    ///
    /// Settings come from `path` (or `config.toml` when it exists), secrets
    /// from the process environment after loading `.env`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let settings = match path {
            Some(path) => Settings::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Settings::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Settings::default(),
        };

        Self::from_env_with(settings, |key| std::env::var(key).ok())
    }

    /// Resolve secrets through `lookup` (the environment in production)
    pub fn from_env_with<F>(settings: Settings, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow!("Missing required environment variable: {}", key))
        };

        let app_private_data = required("APP_PRIVATE_DATA")?;
        let jwt_secret = required("JWT_SECRET")?;

        let port = match lookup("PORT") {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value '{}'", raw))?,
            _ => DEFAULT_PORT,
        };

        settings.validate()?;

        Ok(Self {
            app_private_data,
            jwt_secret,
            port,
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_secrets_are_required() {
        let vars = env(&[("JWT_SECRET", "secret")]);
        let err = Config::from_env_with(Settings::default(), |k| vars.get(k).cloned())
            .unwrap_err();
        assert!(err.to_string().contains("APP_PRIVATE_DATA"));

        let vars = env(&[("APP_PRIVATE_DATA", "data"), ("JWT_SECRET", "  ")]);
        let err = Config::from_env_with(Settings::default(), |k| vars.get(k).cloned())
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_port_defaults_and_parses() {
        let vars = env(&[("APP_PRIVATE_DATA", "data"), ("JWT_SECRET", "secret")]);
        let config = Config::from_env_with(Settings::default(), |k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);

        let vars = env(&[
            ("APP_PRIVATE_DATA", "data"),
            ("JWT_SECRET", "secret"),
            ("PORT", "8080"),
        ]);
        let config = Config::from_env_with(Settings::default(), |k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.port, 8080);

        let vars = env(&[
            ("APP_PRIVATE_DATA", "data"),
            ("JWT_SECRET", "secret"),
            ("PORT", "http"),
        ]);
        assert!(Config::from_env_with(Settings::default(), |k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let vars = env(&[("APP_PRIVATE_DATA", "very-private"), ("JWT_SECRET", "hush")]);
        let config = Config::from_env_with(Settings::default(), |k| vars.get(k).cloned()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("very-private"));
        assert!(!rendered.contains("hush"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            [buy]
            max_amount_usd = 500

            [apis]
            coingecko_timeout_secs = 3
            "#,
        )
        .unwrap();

        assert_eq!(settings.buy.max_amount_usd, 500);
        assert_eq!(settings.buy.session_ttl_secs, 900);
        assert_eq!(settings.apis.coingecko_timeout_secs, 3);
        assert_eq!(settings.chain.chain_id, "8453");
    }

    #[test]
    fn test_invalid_router_rejected() {
        let result = Settings::from_toml(
            r#"
            [chain]
            router_address = "0x1234"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_default_chain_params() {
        let params = Settings::default().chain_params().unwrap();
        assert_eq!(params.chain_id, "8453");
        assert_eq!(params.deadline_secs, 1200);
        assert_eq!(
            format!("{:?}", params.wrapped_native).to_lowercase(),
            "0x4200000000000000000000000000000000000006"
        );
    }
}
