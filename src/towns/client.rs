//! Outbound calls to the Towns bot API
//!
//! [`BotPlatform`] is the seam the handlers and the buy flow talk to;
//! [`TownsClient`] is the HTTP implementation authenticated with the bot's
//! application credential.

use crate::apis::client::HttpClient;
use crate::errors::ApiError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait BotPlatform: Send + Sync {
    async fn send_message(
        &self,
        channel_id: &str,
        text: &str,
        options: Option<MessageOptions>,
    ) -> Result<(), ApiError>;

    async fn send_interaction_request(
        &self,
        channel_id: &str,
        request: &InteractionRequest,
    ) -> Result<(), ApiError>;

    /// Linked wallet address of `user_id`, `None` when the user has none
    async fn wallet_for_user(&self, user_id: &str) -> Result<Option<String>, ApiError>;
}

// =============================================================================
// MESSAGE PAYLOADS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl MessageOptions {
    pub fn with_ticker(address: &str, chain_id: &str) -> Self {
        Self {
            attachments: vec![Attachment::Ticker {
                address: address.to_string(),
                chain_id: chain_id.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Attachment {
    /// Token info card
    Ticker {
        address: String,
        #[serde(rename = "chainId")]
        chain_id: String,
    },
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    message: &'a str,
    #[serde(flatten)]
    options: MessageOptions,
}

// =============================================================================
// INTERACTION REQUESTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InteractionRequest {
    Form(FormRequest),
    Transaction(TransactionRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormRequest {
    pub id: String,
    pub components: Vec<FormButton>,
    pub recipient: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormButton {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
}

impl FormButton {
    pub fn button(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: "button".to_string(),
            label: label.to_string(),
        }
    }
}

impl FormRequest {
    /// Two-button confirm/cancel form addressed to `recipient`
    pub fn confirm_cancel(id: &str, recipient: &str) -> Self {
        Self {
            id: id.to_string(),
            components: vec![
                FormButton::button("confirm", "✅ Confirm"),
                FormButton::button("cancel", "❌ Cancel"),
            ],
            recipient: recipient.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRequest {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub tx: TransactionPayload,
    pub recipient: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub chain_id: String,
    pub to: String,
    /// Hex quantity, `0x`-prefixed
    pub value: String,
    pub data: String,
    pub signer_wallet: String,
}

#[derive(Debug, Deserialize)]
struct WalletResponse {
    #[serde(default)]
    wallet: Option<String>,
}

// =============================================================================
// HTTP IMPLEMENTATION
// =============================================================================

pub struct TownsClient {
    http: HttpClient,
    base_url: String,
}

impl TownsClient {
    pub fn new(base_url: &str, app_private_data: &str, timeout_secs: u64) -> Result<Self, String> {
        Ok(Self {
            http: HttpClient::new("Towns", timeout_secs, 0)?.with_bearer(app_private_data),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/messages", self.base_url, channel_id)
    }

    fn interactions_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/interactions", self.base_url, channel_id)
    }

    fn wallet_url(&self, user_id: &str) -> String {
        format!("{}/users/{}/wallet", self.base_url, user_id)
    }
}

#[async_trait]
impl BotPlatform for TownsClient {
    async fn send_message(
        &self,
        channel_id: &str,
        text: &str,
        options: Option<MessageOptions>,
    ) -> Result<(), ApiError> {
        let body = OutboundMessage {
            message: text,
            options: options.unwrap_or_default(),
        };
        self.http.post_json(&self.messages_url(channel_id), &body).await
    }

    async fn send_interaction_request(
        &self,
        channel_id: &str,
        request: &InteractionRequest,
    ) -> Result<(), ApiError> {
        self.http
            .post_json(&self.interactions_url(channel_id), request)
            .await
    }

    async fn wallet_for_user(&self, user_id: &str) -> Result<Option<String>, ApiError> {
        match self
            .http
            .get_json::<WalletResponse>(&self.wallet_url(user_id))
            .await
        {
            Ok(response) => Ok(response.wallet.filter(|w| !w.trim().is_empty())),
            Err(ApiError::HttpStatus { status: 404, .. }) => {
                logger::debug(LogTag::Bot, &format!("No wallet linked for {}", user_id));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
