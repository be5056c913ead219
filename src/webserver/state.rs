/// Shared application state for the webserver
use crate::towns::BotHandler;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<BotHandler>,
    /// HS256 secret the webhook bearer tokens are signed with
    pub jwt_secret: Arc<String>,
    pub bot_name: String,
    pub bot_description: String,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        handler: Arc<BotHandler>,
        jwt_secret: &str,
        bot_name: &str,
        bot_description: &str,
    ) -> Self {
        Self {
            handler,
            jwt_secret: Arc::new(jwt_secret.to_string()),
            bot_name: bot_name.to_string(),
            bot_description: bot_description.to_string(),
            startup_time: chrono::Utc::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        (chrono::Utc::now() - self.startup_time)
            .num_seconds()
            .max(0) as u64
    }
}
