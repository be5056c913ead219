/// Log tags identify the subsystem a message comes from.
///
/// Each tag maps to a `--debug-<key>` flag that unlocks its debug output.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    System,
    Config,
    Api,
    Market,
    Buy,
    Sessions,
    Bot,
    Webserver,
}

impl LogTag {
    /// Key used by `--debug-<key>` flags
    pub fn to_debug_key(&self) -> &'static str {
        match self {
            LogTag::System | LogTag::Config => "system",
            LogTag::Api => "api",
            LogTag::Market => "market",
            LogTag::Buy => "buy",
            LogTag::Sessions => "sessions",
            LogTag::Bot | LogTag::Webserver => "webhook",
        }
    }

    /// Uncolored label used in the console prefix
    pub fn label(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Api => "API",
            LogTag::Market => "MARKET",
            LogTag::Buy => "BUY",
            LogTag::Sessions => "SESSIONS",
            LogTag::Bot => "BOT",
            LogTag::Webserver => "WEBSERVER",
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
