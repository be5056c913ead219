use std::path::PathBuf;
use std::sync::Arc;

use towns_token_bot::{
    apis::ApiManager,
    arguments::{self, get_config_path, get_enabled_debug_modes, get_port_override, print_help},
    buy::{BuyFlow, BuyFlowSettings, SessionStore},
    config::Config,
    logger::{self, LogTag},
    market::MarketService,
    towns::{BotHandler, TownsClient},
    webserver::{start_server, AppState},
};

/// Main entry point for the Towns token bot
///
/// Loads configuration, wires the market clients, the session store and the
/// buy flow behind the webhook handler, then serves until Ctrl-C.
#[tokio::main]
async fn main() {
    logger::init();

    if arguments::is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    logger::info(LogTag::System, "🚀 Towns token bot starting up...");

    let debug_modes = get_enabled_debug_modes();
    if !debug_modes.is_empty() {
        logger::info(
            LogTag::System,
            &format!("Debug modes enabled: {}", debug_modes.join(", ")),
        );
    }

    if let Err(e) = run().await {
        logger::error(LogTag::System, &format!("❌ {}", e));
        std::process::exit(1);
    }

    logger::info(LogTag::System, "✅ Towns token bot stopped");
}

async fn run() -> anyhow::Result<()> {
    let config_path = get_config_path().map(PathBuf::from);
    let mut config = Config::load(config_path.as_deref())?;

    if let Some(port) = get_port_override().map_err(anyhow::Error::msg)? {
        config.port = port;
    }

    logger::debug(LogTag::Config, &format!("Loaded configuration: {:?}", config));

    let settings = &config.settings;
    let apis = Arc::new(ApiManager::new(settings).map_err(anyhow::Error::msg)?);
    let platform = Arc::new(
        TownsClient::new(
            &settings.bot.api_url,
            &config.app_private_data,
            settings.apis.towns_timeout_secs,
        )
        .map_err(anyhow::Error::msg)?,
    );

    let sessions = Arc::new(SessionStore::new(settings.buy.session_ttl()));
    spawn_session_sweeper(Arc::clone(&sessions), settings.buy.sweep_interval());

    let buy = BuyFlow::new(
        platform.clone(),
        apis.coingecko.clone(),
        apis.geckoterminal.clone(),
        sessions,
        BuyFlowSettings::from_config(&config)?,
    );

    let market = Arc::new(MarketService::new(Arc::clone(&apis), &settings.chain.network));
    let handler = BotHandler::new(platform, market, buy, &settings.chain.chain_id);

    let state = AppState::new(
        Arc::new(handler),
        &config.jwt_secret,
        &settings.bot.name,
        &settings.bot.description,
    );

    start_server(Arc::new(state), config.port)
        .await
        .map_err(anyhow::Error::msg)
}

/// Evict unanswered confirmations on a fixed interval
fn spawn_session_sweeper(sessions: Arc<SessionStore>, interval: std::time::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let evicted = sessions.purge_expired();
            if evicted > 0 {
                logger::debug(
                    LogTag::Sessions,
                    &format!("Sweeper evicted {} sessions ({} pending)", evicted, sessions.len()),
                );
            }
        }
    });
}
