//! Inbound webhook events
//!
//! The platform posts one JSON object per event, discriminated by `type`.
//! Interaction responses carry a loosely shaped `{case, value}` payload which
//! is narrowed into [`InteractionContent`] before the buy flow sees it.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundEvent {
    Message(MessageEvent),
    SlashCommand(SlashCommandEvent),
    InteractionResponse(InteractionResponseEvent),
}

impl InboundEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Message(_) => "message",
            InboundEvent::SlashCommand(_) => "slashCommand",
            InboundEvent::InteractionResponse(_) => "interactionResponse",
        }
    }

    pub fn channel_id(&self) -> &str {
        match self {
            InboundEvent::Message(e) => &e.channel_id,
            InboundEvent::SlashCommand(e) => &e.channel_id,
            InboundEvent::InteractionResponse(e) => &e.channel_id,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            InboundEvent::Message(e) => &e.user_id,
            InboundEvent::SlashCommand(e) => &e.user_id,
            InboundEvent::InteractionResponse(e) => &e.user_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    #[serde(default)]
    pub message: String,
    pub channel_id: String,
    #[serde(default)]
    pub is_mentioned: bool,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlashCommandEvent {
    pub command: String,
    pub channel_id: String,
    pub user_id: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionResponseEvent {
    pub user_id: String,
    pub channel_id: String,
    #[serde(default)]
    response: Option<RawResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawResponse {
    #[serde(default)]
    payload: Option<RawPayload>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPayload {
    #[serde(default)]
    content: Option<RawContent>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawContent {
    #[serde(default)]
    case: Option<String>,
    #[serde(default)]
    value: Option<Value>,
}

impl InteractionResponseEvent {
    /// Typed content, `None` when the case is unknown or the value malformed
    pub fn content(&self) -> Option<InteractionContent> {
        let content = self.response.as_ref()?.payload.as_ref()?.content.as_ref()?;
        let value = content.value.clone()?;

        match content.case.as_deref()? {
            "form" => serde_json::from_value(value)
                .ok()
                .map(InteractionContent::Form),
            "transaction" => serde_json::from_value(value)
                .ok()
                .map(InteractionContent::Transaction),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionContent {
    Form(FormResponse),
    Transaction(TransactionResult),
}

/// A user's answer to a form; `id` is the session id the form was sent with
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormResponse {
    pub id: String,
    #[serde(default)]
    pub components: Vec<FormComponent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormComponent {
    pub id: String,
    #[serde(default)]
    pub component: Option<Value>,
}

impl FormResponse {
    /// True when the confirm button is among the returned components
    pub fn is_confirmed(&self) -> bool {
        self.components.iter().any(|c| c.id == "confirm")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionResult {
    #[serde(default, rename = "txHash")]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> InboundEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_message_event() {
        let event = parse(json!({
            "type": "message",
            "message": "@bot buy $50 of 0xabc",
            "channelId": "chan",
            "isMentioned": true,
            "userId": "0xuser"
        }));
        match event {
            InboundEvent::Message(m) => {
                assert!(m.is_mentioned);
                assert_eq!(m.channel_id, "chan");
                assert_eq!(m.user_id, "0xuser");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_slash_command_args_default() {
        let event = parse(json!({
            "type": "slashCommand",
            "command": "trending",
            "channelId": "chan",
            "userId": "0xuser"
        }));
        assert_eq!(event.kind(), "slashCommand");
        match event {
            InboundEvent::SlashCommand(c) => assert!(c.args.is_empty()),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_form_response_content() {
        let event = parse(json!({
            "type": "interactionResponse",
            "userId": "0xuser",
            "channelId": "chan",
            "response": { "payload": { "content": {
                "case": "form",
                "value": { "id": "buy-1-0-0xuser", "components": [
                    { "id": "confirm", "component": { "case": "button" } }
                ]}
            }}}
        }));
        let InboundEvent::InteractionResponse(response) = event else {
            panic!("expected interaction response");
        };
        match response.content() {
            Some(InteractionContent::Form(form)) => {
                assert_eq!(form.id, "buy-1-0-0xuser");
                assert!(form.is_confirmed());
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_transaction_content() {
        let event = parse(json!({
            "type": "interactionResponse",
            "userId": "0xuser",
            "channelId": "chan",
            "response": { "payload": { "content": {
                "case": "transaction",
                "value": { "txHash": "0xdead" }
            }}}
        }));
        let InboundEvent::InteractionResponse(response) = event else {
            panic!("expected interaction response");
        };
        assert_eq!(
            response.content(),
            Some(InteractionContent::Transaction(TransactionResult {
                tx_hash: Some("0xdead".to_string()),
                error: None,
            }))
        );
    }

    #[test]
    fn test_unknown_or_missing_content() {
        let missing = parse(json!({
            "type": "interactionResponse",
            "userId": "0xuser",
            "channelId": "chan"
        }));
        let unknown = parse(json!({
            "type": "interactionResponse",
            "userId": "0xuser",
            "channelId": "chan",
            "response": { "payload": { "content": { "case": "poll", "value": {} } } }
        }));
        let malformed = parse(json!({
            "type": "interactionResponse",
            "userId": "0xuser",
            "channelId": "chan",
            "response": { "payload": { "content": { "case": "form", "value": { "components": [] } } } }
        }));

        for event in [missing, unknown, malformed] {
            let InboundEvent::InteractionResponse(response) = event else {
                panic!("expected interaction response");
            };
            assert!(response.content().is_none());
        }
    }

    #[test]
    fn test_cancel_is_not_confirmed() {
        let form: FormResponse = serde_json::from_value(json!({
            "id": "buy-1",
            "components": [{ "id": "cancel" }]
        }))
        .unwrap();
        assert!(!form.is_confirmed());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: Result<InboundEvent, _> =
            serde_json::from_value(json!({ "type": "reaction", "channelId": "c" }));
        assert!(result.is_err());
    }
}
