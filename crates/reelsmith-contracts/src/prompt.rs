//! Prompt and message content types.
//!
//! A `PromptPair` is what every prompt template produces: one system
//! instruction and one user message. The user message is plain text unless the
//! template attaches an image, in which case it becomes an ordered list of
//! content parts.

use serde::{Deserialize, Serialize};

/// A single block inside a multi-part message.
///
/// Serialized with a `type` tag so the list can be sent to the provider
/// unchanged: `{"type": "input_text", "text": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    InputText { text: String },
    InputImage { image_url: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::InputText { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::InputImage {
            image_url: url.into(),
        }
    }
}

/// Message body: a plain string or an ordered list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// All text in the message, parts joined by newlines. Image parts are
    /// skipped.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::InputText { text } => Some(text.as_str()),
                    ContentPart::InputImage { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn is_multimodal(&self) -> bool {
        matches!(self, MessageContent::Parts(parts)
            if parts.iter().any(|p| matches!(p, ContentPart::InputImage { .. })))
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Text(s.to_string())
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        MessageContent::Parts(parts)
    }
}

/// The system and user instructions for one agent call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPair {
    pub system_prompt: String,
    pub user_prompt: MessageContent,
}

impl PromptPair {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<MessageContent>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }
}
