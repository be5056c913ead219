//! Event dispatch
//!
//! Every failure stops here: it is logged and turned into at most one chat
//! message in the channel the event came from.

use super::client::{BotPlatform, MessageOptions};
use super::commands::{SlashCommand, CHART_CARD_COUNT, HELP_TEXT};
use super::events::{InboundEvent, InteractionContent, InteractionResponseEvent, SlashCommandEvent};
use crate::buy::BuyFlow;
use crate::errors::{ApiError, BuyFlowError};
use crate::logger::{self, LogTag};
use crate::market::{format_leaderboard, format_single_token, sort_by_time_frame, TimeFrame, TokenSource};
use std::sync::Arc;

pub const FETCH_FAILED_MESSAGE: &str = "❌ Failed to fetch token data. Please try again later.";

pub struct BotHandler {
    platform: Arc<dyn BotPlatform>,
    market: Arc<dyn TokenSource>,
    buy: BuyFlow,
    chain_id: String,
}

impl BotHandler {
    pub fn new(
        platform: Arc<dyn BotPlatform>,
        market: Arc<dyn TokenSource>,
        buy: BuyFlow,
        chain_id: &str,
    ) -> Self {
        Self {
            platform,
            market,
            buy,
            chain_id: chain_id.to_string(),
        }
    }

    pub async fn handle(&self, event: InboundEvent) {
        logger::debug(
            LogTag::Bot,
            &format!(
                "Event {} from {} in {}",
                event.kind(),
                event.user_id(),
                event.channel_id()
            ),
        );

        match event {
            InboundEvent::Message(message) => {
                let result = self.buy.on_message(&message).await;
                self.report(&message.channel_id, result).await;
            }
            InboundEvent::SlashCommand(command) => self.on_slash_command(&command).await,
            InboundEvent::InteractionResponse(response) => {
                self.on_interaction_response(&response).await
            }
        }
    }

    async fn on_slash_command(&self, event: &SlashCommandEvent) {
        let Some(command) = SlashCommand::parse(&event.command) else {
            logger::debug(
                LogTag::Bot,
                &format!("Ignoring unknown command '{}'", event.command),
            );
            return;
        };

        let result = match command {
            SlashCommand::Leaderboard { time_frame, count } => {
                self.send_leaderboard(&event.channel_id, time_frame, count)
                    .await
            }
            SlashCommand::Charts(time_frame) => {
                self.send_chart_cards(&event.channel_id, time_frame).await
            }
            SlashCommand::Help => {
                self.platform
                    .send_message(&event.channel_id, HELP_TEXT, None)
                    .await
            }
        };

        if let Err(e) = result {
            logger::error(
                LogTag::Bot,
                &format!("/{} failed in {}: {}", event.command, event.channel_id, e),
            );
        }
    }

    async fn send_leaderboard(
        &self,
        channel_id: &str,
        time_frame: TimeFrame,
        count: usize,
    ) -> Result<(), ApiError> {
        let tokens = match self.market.top_tokens(count).await {
            Ok(tokens) => sort_by_time_frame(tokens, time_frame),
            Err(e) => return self.fetch_failed(channel_id, e).await,
        };

        let text = format_leaderboard(&tokens, time_frame, count);
        self.platform.send_message(channel_id, &text, None).await
    }

    async fn send_chart_cards(&self, channel_id: &str, time_frame: TimeFrame) -> Result<(), ApiError> {
        let tokens = match self.market.top_tokens(CHART_CARD_COUNT).await {
            Ok(tokens) => sort_by_time_frame(tokens, time_frame),
            Err(e) => return self.fetch_failed(channel_id, e).await,
        };

        for (index, token) in tokens.iter().take(CHART_CARD_COUNT).enumerate() {
            let text = format_single_token(token, index + 1, time_frame);
            let options = token
                .contract_address
                .as_deref()
                .map(|address| MessageOptions::with_ticker(address, &self.chain_id));
            self.platform.send_message(channel_id, &text, options).await?;
        }
        Ok(())
    }

    async fn fetch_failed(&self, channel_id: &str, error: ApiError) -> Result<(), ApiError> {
        logger::error(LogTag::Market, &format!("Token fetch failed: {}", error));
        self.platform
            .send_message(channel_id, FETCH_FAILED_MESSAGE, None)
            .await
    }

    async fn on_interaction_response(&self, event: &InteractionResponseEvent) {
        let result = match event.content() {
            Some(InteractionContent::Form(form)) => {
                self.buy
                    .on_form_response(&event.user_id, &event.channel_id, &form)
                    .await
            }
            Some(InteractionContent::Transaction(result)) => {
                self.buy
                    .on_transaction_result(&event.channel_id, &result)
                    .await
            }
            None => {
                logger::debug(
                    LogTag::Bot,
                    &format!("Ignoring interaction response from {}", event.user_id),
                );
                Ok(())
            }
        };
        self.report(&event.channel_id, result).await;
    }

    /// Log a buy flow failure and send its chat reply, if it has one
    async fn report(&self, channel_id: &str, result: Result<(), BuyFlowError>) {
        let Err(error) = result else {
            return;
        };

        match &error {
            BuyFlowError::SessionMiss(_) => {
                logger::debug(LogTag::Buy, &format!("Ignored: {}", error))
            }
            _ => logger::warning(LogTag::Buy, &format!("Buy flow failed: {}", error)),
        }

        if let Some(text) = error.user_message() {
            if let Err(e) = self.platform.send_message(channel_id, &text, None).await {
                logger::error(
                    LogTag::Bot,
                    &format!("Could not deliver error reply to {}: {}", channel_id, e),
                );
            }
        }
    }
}
