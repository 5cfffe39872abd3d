//! Wire types for the chat-completions endpoint

use council_application::CompletionResponse;
use council_domain::Message;
use serde::{Deserialize, Serialize};

/// `plugins` entry enabling OpenRouter's web search
pub const WEB_PLUGIN_ID: &str = "web";

/// Request body
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<Plugin>>,
}

impl<'a> ChatRequest<'a> {
    pub fn new(model: &'a str, messages: &'a [Message], web_search: bool) -> Self {
        Self {
            model,
            messages,
            plugins: web_search.then(|| {
                vec![Plugin {
                    id: WEB_PLUGIN_ID.to_string(),
                }]
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    pub id: String,
}

/// Response body; only the fields the council reads
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_details: Option<serde_json::Value>,
    #[serde(default)]
    pub annotations: Option<serde_json::Value>,
}

impl ChatResponse {
    /// First choice as a [`CompletionResponse`], if there is one
    pub fn into_first_completion(self) -> Option<CompletionResponse> {
        self.choices.into_iter().next().map(|c| CompletionResponse {
            content: c.message.content,
            reasoning_details: c.message.reasoning_details,
            annotations: c.message.annotations,
        })
    }
}
