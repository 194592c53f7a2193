//! Wire model of the chat platform's webhook body and reply request.

use serde::{Deserialize, Serialize};

const TEXT_TYPE: &str = "text";

/// Body POSTed to the webhook; only the first event is handled.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub events: Vec<EventData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: Option<EventMessage>,
    #[serde(default)]
    pub timestamp: i64,
    pub source: EventSource,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl EventData {
    /// The message text, for text message events only.
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_ref()
            .filter(|message| message.kind == TEXT_TYPE)
            .and_then(|message| message.text.as_deref())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.source.user_id.as_deref()
    }
}

/// Request body for answering an event with one text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyPayload {
    pub reply_token: String,
    pub messages: Vec<ReplyMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ReplyPayload {
    pub fn text(reply_token: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            reply_token: reply_token.into(),
            messages: vec![ReplyMessage {
                kind: TEXT_TYPE.to_string(),
                text: text.into(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "destination": "Uxxxxxxxx",
        "events": [{
            "type": "message",
            "message": { "type": "text", "id": "4680", "text": "食材費 4000" },
            "timestamp": 1672531200000,
            "source": { "type": "user", "userId": "U123" },
            "replyToken": "r-token",
            "mode": "active"
        }]
    }"#;

    #[test]
    fn decodes_text_message_events() {
        let body: WebhookBody = serde_json::from_str(BODY).unwrap();
        let event = &body.events[0];
        assert_eq!(event.kind, "message");
        assert_eq!(event.text(), Some("食材費 4000"));
        assert_eq!(event.user_id(), Some("U123"));
        assert_eq!(event.reply_token.as_deref(), Some("r-token"));
    }

    #[test]
    fn non_text_messages_have_no_text() {
        let body = BODY.replace(r#""type": "text""#, r#""type": "sticker""#);
        let body: WebhookBody = serde_json::from_str(&body).unwrap();
        assert_eq!(body.events[0].text(), None);
    }

    #[test]
    fn reply_payload_uses_platform_field_names() {
        let payload = ReplyPayload::text("r-token", "2023/01");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["replyToken"], "r-token");
        assert_eq!(json["messages"][0]["type"], "text");
        assert_eq!(json["messages"][0]["text"], "2023/01");
    }
}
