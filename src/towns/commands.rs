//! Slash command registry

use crate::market::TimeFrame;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BotCommand {
    pub name: &'static str,
    pub description: &'static str,
}

/// Commands advertised in the agent metadata, in help order
pub const COMMANDS: &[BotCommand] = &[
    BotCommand { name: "trending", description: "Top 10 trending tokens (24h)" },
    BotCommand { name: "hot", description: "Top 10 hottest tokens (1h)" },
    BotCommand { name: "rising", description: "Top 10 rising tokens (6h)" },
    BotCommand { name: "top20", description: "Top 20 trending tokens (24h)" },
    BotCommand { name: "hot20", description: "Top 20 hottest tokens (1h)" },
    BotCommand { name: "top50", description: "Top 50 trending tokens (24h)" },
    BotCommand { name: "hot50", description: "Top 50 hottest tokens (1h)" },
    BotCommand { name: "charts", description: "Top 5 token cards (24h)" },
    BotCommand { name: "hotcharts", description: "Top 5 token cards (1h)" },
    BotCommand { name: "help", description: "Show available commands" },
];

/// Number of cards sent by the chart commands
pub const CHART_CARD_COUNT: usize = 5;

pub const HELP_TEXT: &str = "**📊 Base Token Tracker Commands**\n\n\
**📋 List:** `/trending` `/hot` `/rising` `/top20` `/top50` `/hot20` `/hot50`\n\n\
**📈 Charts:** `/charts` `/hotcharts` – token cards\n\n\
**💰 Buy (with confirmation):**\n\
Mention the bot and say: *buy $50 of 0x...*\n\
You’ll get a confirmation form, then sign the swap in your Towns wallet.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashCommand {
    Leaderboard { time_frame: TimeFrame, count: usize },
    Charts(TimeFrame),
    Help,
}

impl SlashCommand {
    /// Map a command name, with or without the leading slash
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('/').to_lowercase();
        let command = match name.as_str() {
            "trending" => Self::leaderboard(TimeFrame::H24, 10),
            "hot" => Self::leaderboard(TimeFrame::H1, 10),
            "rising" => Self::leaderboard(TimeFrame::H6, 10),
            "top20" => Self::leaderboard(TimeFrame::H24, 20),
            "hot20" => Self::leaderboard(TimeFrame::H1, 20),
            "top50" => Self::leaderboard(TimeFrame::H24, 50),
            "hot50" => Self::leaderboard(TimeFrame::H1, 50),
            "charts" => SlashCommand::Charts(TimeFrame::H24),
            "hotcharts" => SlashCommand::Charts(TimeFrame::H1),
            "help" => SlashCommand::Help,
            _ => return None,
        };
        Some(command)
    }

    fn leaderboard(time_frame: TimeFrame, count: usize) -> Self {
        SlashCommand::Leaderboard { time_frame, count }
    }
}
