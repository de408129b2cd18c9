use serde::{Deserialize, Serialize};

/// A message sent to a LINE user through the push or reply API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    /// A Flex Message; `contents` is the bubble/carousel JSON.
    Flex {
        #[serde(rename = "altText")]
        alt_text: String,
        contents: serde_json::Value,
    },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        OutboundMessage::Text { text: text.into() }
    }

    pub fn flex(alt_text: impl Into<String>, contents: serde_json::Value) -> Self {
        OutboundMessage::Flex {
            alt_text: alt_text.into(),
            contents,
        }
    }
}
