//! LINE webhook events, validated at the boundary.
//!
//! The platform sends `{ "destination": ..., "events": [ ... ] }`. Each event
//! is parsed on its own so that one malformed or unknown event never poisons
//! the rest of the delivery.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::ExternalId;

/// Raw delivery envelope. Events stay untyped until [`WebhookEvent::parse`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<Value>,
}

/// Who triggered the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type", default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

impl EventSource {
    /// The acting user, when the source carries a valid LINE user id.
    pub fn external_id(&self) -> Option<ExternalId> {
        self.user_id.as_deref().and_then(|id| ExternalId::parse(id).ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryContext {
    #[serde(default)]
    pub is_redelivery: bool,
}

/// Fields every event type carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    pub source: EventSource,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub webhook_event_id: Option<String>,
    #[serde(default)]
    pub delivery_context: DeliveryContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub reply_token: String,
    pub message: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEvent {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub reply_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfollowEvent {
    #[serde(flatten)]
    pub meta: EventMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostbackData {
    pub data: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostbackEvent {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub reply_token: String,
    pub postback: PostbackData,
}

/// A single, typed webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    Message(MessageEvent),
    Follow(FollowEvent),
    Unfollow(UnfollowEvent),
    Postback(PostbackEvent),
    /// Any event type this service does not act on (join, leave, beacon, ...).
    Unknown { event_type: String },
}

/// Raised when a known event type is missing required fields.
#[derive(Debug, thiserror::Error)]
#[error("malformed {event_type} event: {source}")]
pub struct MalformedEvent {
    pub event_type: String,
    #[source]
    pub source: serde_json::Error,
}

impl WebhookEvent {
    /// Parse one element of the `events` array.
    pub fn parse(raw: Value) -> Result<Self, MalformedEvent> {
        let event_type = raw
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let wrap = |source| MalformedEvent {
            event_type: event_type.clone(),
            source,
        };

        match event_type.as_str() {
            "message" => serde_json::from_value(raw).map(WebhookEvent::Message).map_err(wrap),
            "follow" => serde_json::from_value(raw).map(WebhookEvent::Follow).map_err(wrap),
            "unfollow" => serde_json::from_value(raw).map(WebhookEvent::Unfollow).map_err(wrap),
            "postback" => serde_json::from_value(raw).map(WebhookEvent::Postback).map_err(wrap),
            _ => Ok(WebhookEvent::Unknown {
                event_type: event_type.clone(),
            }),
        }
    }

    pub fn event_type(&self) -> &str {
        match self {
            WebhookEvent::Message(_) => "message",
            WebhookEvent::Follow(_) => "follow",
            WebhookEvent::Unfollow(_) => "unfollow",
            WebhookEvent::Postback(_) => "postback",
            WebhookEvent::Unknown { event_type } => event_type,
        }
    }

    pub fn meta(&self) -> Option<&EventMeta> {
        match self {
            WebhookEvent::Message(e) => Some(&e.meta),
            WebhookEvent::Follow(e) => Some(&e.meta),
            WebhookEvent::Unfollow(e) => Some(&e.meta),
            WebhookEvent::Postback(e) => Some(&e.meta),
            WebhookEvent::Unknown { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_text_message() {
        let raw = json!({
            "type": "message",
            "replyToken": "rt-1",
            "timestamp": 1_700_000_000_000_i64,
            "webhookEventId": "01H",
            "deliveryContext": { "isRedelivery": false },
            "source": { "type": "user", "userId": "Uabc123" },
            "message": { "id": "m1", "type": "text", "text": "hello" }
        });
        let WebhookEvent::Message(ev) = WebhookEvent::parse(raw).unwrap() else {
            panic!("expected message event");
        };
        assert_eq!(ev.reply_token, "rt-1");
        assert_eq!(ev.message.text.as_deref(), Some("hello"));
        assert_eq!(ev.meta.source.external_id().unwrap().as_str(), "Uabc123");
    }

    #[test]
    fn parses_postback_and_unfollow() {
        let postback = json!({
            "type": "postback",
            "replyToken": "rt-2",
            "source": { "type": "user", "userId": "Uabc" },
            "postback": { "data": "action=status&order=12" }
        });
        assert!(matches!(
            WebhookEvent::parse(postback).unwrap(),
            WebhookEvent::Postback(ref e) if e.postback.data == "action=status&order=12"
        ));

        let unfollow = json!({ "type": "unfollow", "source": { "userId": "Uabc" } });
        assert_eq!(WebhookEvent::parse(unfollow).unwrap().event_type(), "unfollow");
    }

    #[test]
    fn unknown_types_are_kept_by_name() {
        let ev = WebhookEvent::parse(json!({ "type": "beacon", "source": {} })).unwrap();
        assert_eq!(ev, WebhookEvent::Unknown { event_type: "beacon".into() });
        assert!(ev.meta().is_none());
    }

    #[test]
    fn known_type_missing_fields_is_malformed() {
        let err = WebhookEvent::parse(json!({ "type": "message", "source": {} })).unwrap_err();
        assert_eq!(err.event_type, "message");
    }

    #[test]
    fn envelope_defaults_to_no_events() {
        let env: WebhookEnvelope = serde_json::from_str("{}").unwrap();
        assert!(env.events.is_empty());
    }
}
