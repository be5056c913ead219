//! Buy confirmation flow
//!
//! A "buy $N of 0x..." mention opens a confirmation form and parks the intent
//! in the session store. Confirming prices the spend against the native asset,
//! builds the router swap and sends it as a transaction request. The signed
//! result is answered with an explorer link. Answers to expired or already
//! used forms are dropped.

use super::intent::parse_buy_intent_with_ceiling;
use super::session::{PendingPurchase, SessionStore};
use super::swap::{build_swap_tx, parse_address, ChainParams, SwapParams};
use crate::apis::{PriceOracle, TokenInfoLookup};
use crate::config::Config;
use crate::errors::{BuyFlowError, InteractionKind};
use crate::logger::{self, LogTag};
use crate::towns::client::{
    BotPlatform, FormRequest, InteractionRequest, TransactionPayload, TransactionRequest,
};
use crate::towns::events::{FormResponse, MessageEvent, TransactionResult};
use rust_decimal::Decimal;
use std::sync::Arc;

pub const USAGE_HINT: &str =
    "To buy a token: *@me buy $50 of 0x...* (then confirm in the form). Use `/help` for other commands.";

const PREPARING_MESSAGE: &str = "⏳ **Preparing your swap…** You’ll get a **sign request** in your Towns wallet in a moment — approve it to complete the buy.";

#[derive(Debug, Clone)]
pub struct BuyFlowSettings {
    pub chain: ChainParams,
    /// Largest accepted USD amount
    pub ceiling: Decimal,
    pub slippage_percent: f64,
    /// Explorer prefix the transaction hash is appended to
    pub explorer_tx_url: String,
}

impl BuyFlowSettings {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let settings = &config.settings;
        Ok(Self {
            chain: settings.chain_params()?,
            ceiling: settings.buy.ceiling(),
            slippage_percent: settings.buy.slippage_percent,
            explorer_tx_url: settings.chain.explorer_tx_url.clone(),
        })
    }
}

/// Drives a purchase from the first mention to the signed-transaction result
pub struct BuyFlow {
    platform: Arc<dyn BotPlatform>,
    oracle: Arc<dyn PriceOracle>,
    token_info: Arc<dyn TokenInfoLookup>,
    sessions: Arc<SessionStore>,
    settings: BuyFlowSettings,
}

impl BuyFlow {
    pub fn new(
        platform: Arc<dyn BotPlatform>,
        oracle: Arc<dyn PriceOracle>,
        token_info: Arc<dyn TokenInfoLookup>,
        sessions: Arc<SessionStore>,
        settings: BuyFlowSettings,
    ) -> Self {
        Self {
            platform,
            oracle,
            token_info,
            sessions,
            settings,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Mentions either open a confirmation session or get the usage hint
    pub async fn on_message(&self, event: &MessageEvent) -> Result<(), BuyFlowError> {
        if !event.is_mentioned {
            return Ok(());
        }

        let Some(intent) = parse_buy_intent_with_ceiling(&event.message, self.settings.ceiling)
        else {
            return self.send(&event.channel_id, USAGE_HINT).await;
        };

        logger::info(
            LogTag::Buy,
            &format!(
                "Buy request from {}: ${} of {}",
                event.user_id, intent.amount_usd, intent.token_address
            ),
        );

        let info = self.token_info.token_info(&intent.token_address).await;
        if info.is_none() {
            logger::debug(
                LogTag::Buy,
                &format!("No token info for {}", intent.token_address),
            );
        }

        let session_id =
            self.sessions
                .create(&intent, &event.user_id, &event.channel_id, info.as_ref());

        let form = InteractionRequest::Form(FormRequest::confirm_cancel(&session_id, &event.user_id));
        if let Err(e) = self
            .platform
            .send_interaction_request(&event.channel_id, &form)
            .await
        {
            self.sessions.discard(&session_id);
            return Err(BuyFlowError::InteractionUnavailable {
                kind: InteractionKind::Confirmation,
                source: e,
            });
        }

        let token_label = info
            .map(|i| format!("**{} (${})**", i.name, i.symbol))
            .unwrap_or_else(|| "token".to_string());
        let text = format!(
            "**Confirm buy**\nSpend **${}** (in ETH) to buy {}\n`{}`\n\n👆 Click **Confirm** above — then you’ll get a **sign request** in your Towns wallet to complete the swap. Click **Cancel** to abort.",
            intent.amount_usd.normalize(),
            token_label,
            intent.token_address
        );
        self.send(&event.channel_id, &text).await
    }

    /// Answer to the confirm/cancel form
    ///
    /// The session is taken before anything else is awaited, so a replayed
    /// response finds nothing and is ignored.
    pub async fn on_form_response(
        &self,
        user_id: &str,
        channel_id: &str,
        form: &FormResponse,
    ) -> Result<(), BuyFlowError> {
        let pending = self
            .sessions
            .consume_for_user(&form.id, user_id)
            .ok_or_else(|| BuyFlowError::SessionMiss(form.id.clone()))?;

        if !form.is_confirmed() {
            logger::info(LogTag::Buy, &format!("Session {} cancelled", pending.session_id));
            return self.send(channel_id, "❌ Buy cancelled.").await;
        }

        let wallet = self
            .platform
            .wallet_for_user(user_id)
            .await
            .map_err(BuyFlowError::WalletLookup)?
            .ok_or_else(|| BuyFlowError::WalletUnlinked(user_id.to_string()))?;

        self.send(channel_id, PREPARING_MESSAGE).await?;

        let request = self.transaction_request(&pending, user_id, &wallet).await?;
        self.platform
            .send_interaction_request(channel_id, &request)
            .await
            .map_err(|e| BuyFlowError::InteractionUnavailable {
                kind: InteractionKind::Transaction,
                source: e,
            })?;

        logger::info(
            LogTag::Buy,
            &format!(
                "Swap request sent for session {} (${} of {})",
                pending.session_id, pending.amount_usd, pending.token_address
            ),
        );

        let token_suffix = pending
            .token_label()
            .map(|label| format!(" {}", label))
            .unwrap_or_default();
        let text = format!(
            "📤 **Sign the transaction** in your Towns wallet (check the wallet / notification) to complete the buy.{} Tokens will be sent to your linked wallet.",
            token_suffix
        );
        self.send(channel_id, &text).await
    }

    /// Outcome reported by the wallet after the user signed or rejected
    pub async fn on_transaction_result(
        &self,
        channel_id: &str,
        result: &TransactionResult,
    ) -> Result<(), BuyFlowError> {
        if let Some(hash) = result.tx_hash.as_deref().filter(|h| !h.is_empty()) {
            logger::info(LogTag::Buy, &format!("Swap submitted: {}", hash));
            let text = format!(
                "✅ **Swap submitted!**\n\n📊 **View progress:** [BaseScan]({}{})\n\nYou can watch the tx (pending → confirmed) and see when tokens arrive in your wallet.",
                self.settings.explorer_tx_url, hash
            );
            return self.send(channel_id, &text).await;
        }

        if let Some(error) = result.error.as_deref().filter(|e| !e.is_empty()) {
            logger::warning(LogTag::Buy, &format!("Swap failed in wallet: {}", error));
            return self.send(channel_id, &format!("❌ Swap failed: {}", error)).await;
        }

        Ok(())
    }

    async fn transaction_request(
        &self,
        pending: &PendingPurchase,
        user_id: &str,
        wallet: &str,
    ) -> Result<InteractionRequest, BuyFlowError> {
        let native_price_usd = self
            .oracle
            .native_price_usd()
            .await
            .map_err(BuyFlowError::Oracle)?;

        let params = SwapParams {
            amount_usd: pending.amount_usd,
            native_price_usd,
            token: parse_address(&pending.token_address)?,
            recipient: parse_address(wallet)?,
            slippage_percent: self.settings.slippage_percent,
        };
        let tx = build_swap_tx(&params, &self.settings.chain)?;

        logger::debug(
            LogTag::Buy,
            &format!(
                "Built swap: value {} wei at ${:.2}/ETH, deadline {}",
                tx.value, native_price_usd, tx.deadline
            ),
        );

        let subtitle_token = match &pending.resolved_symbol {
            Some(symbol) => format!("${}", symbol),
            None => format!(
                "token {}...",
                pending.token_address.get(..10).unwrap_or(&pending.token_address)
            ),
        };

        Ok(InteractionRequest::Transaction(TransactionRequest {
            id: format!("swap-{}", pending.session_id),
            title: "Swap ETH for token".to_string(),
            subtitle: format!(
                "Spend ~${} in ETH → {}",
                pending.amount_usd.normalize(),
                subtitle_token
            ),
            tx: TransactionPayload {
                chain_id: tx.chain_id.clone(),
                to: tx.to.to_checksum(None),
                value: tx.value_hex(),
                data: tx.data_hex(),
                signer_wallet: wallet.to_string(),
            },
            recipient: user_id.to_string(),
        }))
    }

    async fn send(&self, channel_id: &str, text: &str) -> Result<(), BuyFlowError> {
        self.platform
            .send_message(channel_id, text, None)
            .await
            .map_err(BuyFlowError::Send)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::apis::TokenInfo;
    use crate::errors::ApiError;
    use crate::towns::client::MessageOptions;
    use crate::towns::events::FormComponent;
    use alloy::primitives::U256;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    pub const TOKEN: &str = "0x4ed4e862860bed51a9570b96d89af5e1b0efefed";
    const WALLET: &str = "0x1111111111111111111111111111111111111111";

    #[derive(Debug, Clone, PartialEq)]
    pub enum Sent {
        Message { channel: String, text: String, options: Option<MessageOptions> },
        Request { channel: String, request: InteractionRequest },
    }

    #[derive(Default)]
    pub struct FakePlatform {
        pub sent: Mutex<Vec<Sent>>,
        pub wallet: Option<String>,
        pub fail_requests: bool,
    }

    impl FakePlatform {
        pub fn with_wallet() -> Self {
            Self {
                wallet: Some(WALLET.to_string()),
                ..Default::default()
            }
        }

        pub fn messages(&self) -> Vec<String> {
            self.sent
                .lock()
                .iter()
                .filter_map(|s| match s {
                    Sent::Message { text, .. } => Some(text.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn requests(&self) -> Vec<InteractionRequest> {
            self.sent
                .lock()
                .iter()
                .filter_map(|s| match s {
                    Sent::Request { request, .. } => Some(request.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl BotPlatform for FakePlatform {
        async fn send_message(
            &self,
            channel_id: &str,
            text: &str,
            options: Option<MessageOptions>,
        ) -> Result<(), ApiError> {
            self.sent.lock().push(Sent::Message {
                channel: channel_id.to_string(),
                text: text.to_string(),
                options,
            });
            Ok(())
        }

        async fn send_interaction_request(
            &self,
            channel_id: &str,
            request: &InteractionRequest,
        ) -> Result<(), ApiError> {
            if self.fail_requests {
                return Err(ApiError::HttpStatus { status: 501, body: String::new() });
            }
            self.sent.lock().push(Sent::Request {
                channel: channel_id.to_string(),
                request: request.clone(),
            });
            Ok(())
        }

        async fn wallet_for_user(&self, _user_id: &str) -> Result<Option<String>, ApiError> {
            Ok(self.wallet.clone())
        }
    }

    pub struct FakeOracle {
        pub price: Result<f64, ApiError>,
        pub calls: Mutex<usize>,
    }

    impl FakeOracle {
        pub fn new(price: Result<f64, ApiError>) -> Self {
            Self { price, calls: Mutex::new(0) }
        }
    }

    #[async_trait]
    impl PriceOracle for FakeOracle {
        async fn native_price_usd(&self) -> Result<f64, ApiError> {
            *self.calls.lock() += 1;
            self.price.clone()
        }
    }

    pub struct FakeLookup(pub Option<TokenInfo>);

    #[async_trait]
    impl TokenInfoLookup for FakeLookup {
        async fn token_info(&self, _address: &str) -> Option<TokenInfo> {
            self.0.clone()
        }
    }

    pub fn degen() -> Option<TokenInfo> {
        Some(TokenInfo {
            symbol: "DEGEN".to_string(),
            name: "Degen".to_string(),
        })
    }

    pub fn flow_settings() -> BuyFlowSettings {
        BuyFlowSettings {
            chain: crate::config::Settings::default().chain_params().unwrap(),
            ceiling: Decimal::from(1_000_000),
            slippage_percent: 2.0,
            explorer_tx_url: "https://basescan.org/tx/".to_string(),
        }
    }

    fn flow(
        platform: Arc<FakePlatform>,
        oracle: Arc<FakeOracle>,
        info: Option<TokenInfo>,
    ) -> BuyFlow {
        BuyFlow::new(
            platform,
            oracle,
            Arc::new(FakeLookup(info)),
            Arc::new(SessionStore::new(Duration::from_secs(60))),
            flow_settings(),
        )
    }

    fn mention(text: &str) -> MessageEvent {
        MessageEvent {
            message: text.to_string(),
            channel_id: "chan".to_string(),
            is_mentioned: true,
            user_id: "0xuser".to_string(),
        }
    }

    fn answer(id: &str, button: &str) -> FormResponse {
        FormResponse {
            id: id.to_string(),
            components: vec![FormComponent {
                id: button.to_string(),
                component: None,
            }],
        }
    }

    fn form_id(platform: &FakePlatform) -> String {
        match platform.requests().first() {
            Some(InteractionRequest::Form(form)) => form.id.clone(),
            other => panic!("expected a form, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unmentioned_message_is_ignored() {
        let platform = Arc::new(FakePlatform::with_wallet());
        let flow = flow(platform.clone(), Arc::new(FakeOracle::new(Ok(2000.0))), None);

        let mut event = mention(&format!("buy $50 of {}", TOKEN));
        event.is_mentioned = false;
        flow.on_message(&event).await.unwrap();

        assert!(platform.sent.lock().is_empty());
        assert!(flow.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_mention_without_intent_gets_usage_hint() {
        let platform = Arc::new(FakePlatform::with_wallet());
        let flow = flow(platform.clone(), Arc::new(FakeOracle::new(Ok(2000.0))), None);

        flow.on_message(&mention("buy some tokens please")).await.unwrap();
        assert_eq!(platform.messages(), vec![USAGE_HINT.to_string()]);
        assert!(flow.sessions().is_empty());
    }

    #[tokio::test]
    async fn test_buy_request_sends_form_then_confirm_text() {
        let platform = Arc::new(FakePlatform::with_wallet());
        let flow = flow(platform.clone(), Arc::new(FakeOracle::new(Ok(2000.0))), degen());

        flow.on_message(&mention(&format!("@bot buy $50 of {}", TOKEN)))
            .await
            .unwrap();

        let sent = platform.sent.lock().clone();
        assert_eq!(sent.len(), 2);
        match &sent[0] {
            Sent::Request { request: InteractionRequest::Form(form), channel } => {
                assert_eq!(channel, "chan");
                assert_eq!(form.recipient, "0xuser");
                assert!(form.id.starts_with("buy-"));
                assert_eq!(form.components.len(), 2);
            }
            other => panic!("expected form first, got {:?}", other),
        }
        match &sent[1] {
            Sent::Message { text, .. } => {
                assert!(text.starts_with("**Confirm buy**\nSpend **$50** (in ETH) to buy **Degen ($DEGEN)**"));
                assert!(text.contains(TOKEN));
            }
            other => panic!("expected confirm text, got {:?}", other),
        }
        assert_eq!(flow.sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_token_gets_generic_label() {
        let platform = Arc::new(FakePlatform::with_wallet());
        let flow = flow(platform.clone(), Arc::new(FakeOracle::new(Ok(2000.0))), None);

        flow.on_message(&mention(&format!("buy $1,000.50 of {}", TOKEN)))
            .await
            .unwrap();
        assert!(platform.messages()[0].contains("Spend **$1000.5** (in ETH) to buy token\n"));
    }

    #[tokio::test]
    async fn test_form_failure_discards_session() {
        let platform = Arc::new(FakePlatform {
            wallet: Some(WALLET.to_string()),
            fail_requests: true,
            ..Default::default()
        });
        let flow = flow(platform.clone(), Arc::new(FakeOracle::new(Ok(2000.0))), None);

        let err = flow
            .on_message(&mention(&format!("buy $50 of {}", TOKEN)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BuyFlowError::InteractionUnavailable { kind: InteractionKind::Confirmation, .. }
        ));
        assert!(flow.sessions().is_empty());
        assert!(platform.messages().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_builds_transaction_request() {
        let platform = Arc::new(FakePlatform::with_wallet());
        let oracle = Arc::new(FakeOracle::new(Ok(2000.0)));
        let flow = flow(platform.clone(), oracle.clone(), degen());

        flow.on_message(&mention(&format!("buy $100 of {}", TOKEN)))
            .await
            .unwrap();
        let id = form_id(&platform);

        flow.on_form_response("0xuser", "chan", &answer(&id, "confirm"))
            .await
            .unwrap();

        let requests = platform.requests();
        let InteractionRequest::Transaction(tx) = &requests[1] else {
            panic!("expected transaction request, got {:?}", requests[1]);
        };
        assert_eq!(tx.id, format!("swap-{}", id));
        assert_eq!(tx.title, "Swap ETH for token");
        assert_eq!(tx.subtitle, "Spend ~$100 in ETH → $DEGEN");
        assert_eq!(tx.tx.chain_id, "8453");
        assert_eq!(tx.tx.value, format!("0x{:x}", U256::from(50_000_000_000_000_000u128)));
        assert!(tx.tx.data.starts_with("0x7ff36ab5"));
        assert_eq!(tx.tx.signer_wallet, WALLET);
        assert_eq!(tx.recipient, "0xuser");
        assert_eq!(tx.tx.to.to_lowercase(), "0x4752ba5dbc23f44d87826276bf6fd6b1c372ad24");

        let messages = platform.messages();
        assert_eq!(messages[1], PREPARING_MESSAGE);
        assert!(messages[2].starts_with("📤 **Sign the transaction**"));
        assert!(messages[2].contains("**Degen ($DEGEN)**"));
        assert_eq!(*oracle.calls.lock(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_confirmation_is_ignored() {
        let platform = Arc::new(FakePlatform::with_wallet());
        let oracle = Arc::new(FakeOracle::new(Ok(2000.0)));
        let flow = flow(platform.clone(), oracle.clone(), None);

        flow.on_message(&mention(&format!("buy $10 of {}", TOKEN)))
            .await
            .unwrap();
        let id = form_id(&platform);

        flow.on_form_response("0xuser", "chan", &answer(&id, "confirm"))
            .await
            .unwrap();
        let sent_after_first = platform.sent.lock().len();

        let err = flow
            .on_form_response("0xuser", "chan", &answer(&id, "confirm"))
            .await
            .unwrap_err();
        assert!(matches!(err, BuyFlowError::SessionMiss(_)));
        assert_eq!(platform.sent.lock().len(), sent_after_first);
        assert_eq!(*oracle.calls.lock(), 1);
    }

    #[tokio::test]
    async fn test_cancel_consumes_session() {
        let platform = Arc::new(FakePlatform::with_wallet());
        let oracle = Arc::new(FakeOracle::new(Ok(2000.0)));
        let flow = flow(platform.clone(), oracle.clone(), None);

        flow.on_message(&mention(&format!("buy $10 of {}", TOKEN)))
            .await
            .unwrap();
        let id = form_id(&platform);

        flow.on_form_response("0xuser", "chan", &answer(&id, "cancel"))
            .await
            .unwrap();
        assert_eq!(platform.messages().last().map(String::as_str), Some("❌ Buy cancelled."));
        assert!(flow.sessions().is_empty());
        assert_eq!(*oracle.calls.lock(), 0);
    }

    #[tokio::test]
    async fn test_other_user_cannot_confirm() {
        let platform = Arc::new(FakePlatform::with_wallet());
        let flow = flow(platform.clone(), Arc::new(FakeOracle::new(Ok(2000.0))), None);

        flow.on_message(&mention(&format!("buy $10 of {}", TOKEN)))
            .await
            .unwrap();
        let id = form_id(&platform);

        let err = flow
            .on_form_response("0xmallory", "chan", &answer(&id, "confirm"))
            .await
            .unwrap_err();
        assert!(matches!(err, BuyFlowError::SessionMiss(_)));
        assert_eq!(flow.sessions().len(), 1);
    }

    #[tokio::test]
    async fn test_unlinked_wallet_aborts_before_pricing() {
        let platform = Arc::new(FakePlatform::default());
        let oracle = Arc::new(FakeOracle::new(Ok(2000.0)));
        let flow = flow(platform.clone(), oracle.clone(), None);

        flow.on_message(&mention(&format!("buy $10 of {}", TOKEN)))
            .await
            .unwrap();
        let id = form_id(&platform);

        let err = flow
            .on_form_response("0xuser", "chan", &answer(&id, "confirm"))
            .await
            .unwrap_err();
        assert!(matches!(err, BuyFlowError::WalletUnlinked(_)));
        assert_eq!(*oracle.calls.lock(), 0);
    }

    #[tokio::test]
    async fn test_oracle_failure_never_builds_transaction() {
        for price in [
            Err(ApiError::HttpStatus { status: 503, body: String::new() }),
            Ok(0.0),
            Ok(-1.0),
        ] {
            let platform = Arc::new(FakePlatform::with_wallet());
            let flow = flow(platform.clone(), Arc::new(FakeOracle::new(price)), None);

            flow.on_message(&mention(&format!("buy $10 of {}", TOKEN)))
                .await
                .unwrap();
            let id = form_id(&platform);

            let err = flow
                .on_form_response("0xuser", "chan", &answer(&id, "confirm"))
                .await
                .unwrap_err();
            assert!(err.user_message().is_some());
            assert!(matches!(
                err,
                BuyFlowError::Oracle(_) | BuyFlowError::SwapBuild(_)
            ));
            assert!(platform
                .requests()
                .iter()
                .all(|r| matches!(r, InteractionRequest::Form(_))));
        }
    }

    #[tokio::test]
    async fn test_subtitle_without_symbol_uses_address_prefix() {
        let platform = Arc::new(FakePlatform::with_wallet());
        let flow = flow(platform.clone(), Arc::new(FakeOracle::new(Ok(2000.0))), None);

        flow.on_message(&mention(&format!("buy $25 of {}", TOKEN)))
            .await
            .unwrap();
        let id = form_id(&platform);
        flow.on_form_response("0xuser", "chan", &answer(&id, "confirm"))
            .await
            .unwrap();

        let InteractionRequest::Transaction(tx) = &platform.requests()[1] else {
            panic!("expected transaction request");
        };
        assert_eq!(tx.subtitle, "Spend ~$25 in ETH → token 0x4ed4e862...");
    }

    #[tokio::test]
    async fn test_transaction_results() {
        let platform = Arc::new(FakePlatform::with_wallet());
        let flow = flow(platform.clone(), Arc::new(FakeOracle::new(Ok(2000.0))), None);

        flow.on_transaction_result(
            "chan",
            &TransactionResult { tx_hash: Some("0xabc".to_string()), error: None },
        )
        .await
        .unwrap();
        flow.on_transaction_result(
            "chan",
            &TransactionResult { tx_hash: None, error: Some("user rejected".to_string()) },
        )
        .await
        .unwrap();
        flow.on_transaction_result("chan", &TransactionResult { tx_hash: None, error: None })
            .await
            .unwrap();

        let messages = platform.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("[BaseScan](https://basescan.org/tx/0xabc)"));
        assert_eq!(messages[1], "❌ Swap failed: user rejected");
    }
}
