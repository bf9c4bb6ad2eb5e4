use serde::{Deserialize, Serialize};

/// MIME type declared for every inline image, whatever its real encoding.
pub const INLINE_IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Role attached to every envelope built by the gateway.
pub const USER_ROLE: &str = "user";

/// Base64 media payload embedded directly in a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineMediaPart {
    pub mime_type: String,
    pub data: String,
}

impl InlineMediaPart {
    pub fn jpeg(data: String) -> Self {
        Self {
            mime_type: INLINE_IMAGE_MIME_TYPE.to_string(),
            data,
        }
    }
}

/// One element of an envelope's `parts` list.
///
/// Serialized in the Gemini wire shape: `{"inlineData": {...}}` or
/// `{"text": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineMediaPart,
    },
    Text {
        text: String,
    },
}

/// A single user turn: role plus ordered parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEnvelope {
    pub role: String,
    pub parts: Vec<Part>,
}

impl ContentEnvelope {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: USER_ROLE.to_string(),
            parts,
        }
    }
}
