//! Generate Title use case
//!
//! Produces a short conversation title from the first user question.

use crate::config::CouncilConfig;
use crate::gateway::ModelClient;
use crate::ports::llm_gateway::{LlmGateway, QueryOptions};
use council_domain::core::string::{strip_quotes, truncate_chars};
use council_domain::{Message, Model, PromptTemplate};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Title used whenever the model gives nothing usable
pub const FALLBACK_TITLE: &str = "New Conversation";

/// Longest title kept as-is, in characters
const MAX_TITLE_CHARS: usize = 50;

pub struct GenerateTitleUseCase<G: LlmGateway + 'static> {
    client: ModelClient<G>,
    model: Model,
    timeout: Duration,
}

impl<G: LlmGateway + 'static> GenerateTitleUseCase<G> {
    pub fn new(gateway: Arc<G>, config: &CouncilConfig) -> Self {
        Self {
            client: ModelClient::new(gateway).with_policy(config.retry.clone()),
            model: config.title_model.clone(),
            timeout: config.title_timeout,
        }
    }

    /// Ask the title model for a 3-5 word title; never fails
    pub async fn execute(&self, query: &str) -> String {
        let messages = [Message::user(PromptTemplate::title_prompt(query))];
        let options = QueryOptions::default().with_timeout(self.timeout);

        match self.client.query(&self.model, &messages, &options).await {
            Ok(response) => clean_title(response.text()),
            Err(_) => FALLBACK_TITLE.to_string(),
        }
    }
}

fn clean_title(raw: &str) -> String {
    let title = strip_quotes(raw.trim()).trim();
    if title.is_empty() {
        debug!("title model returned empty content");
        return FALLBACK_TITLE.to_string();
    }
    truncate_chars(title, MAX_TITLE_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::{CompletionResponse, GatewayError};
    use crate::testing::{Script, ScriptedGateway, fast_policy};

    fn use_case(gateway: &Arc<ScriptedGateway>) -> GenerateTitleUseCase<ScriptedGateway> {
        let config = CouncilConfig::default().with_retry(fast_policy());
        GenerateTitleUseCase::new(Arc::clone(gateway), &config)
    }

    const TITLE_MODEL: &str = "google/gemini-2.5-flash";

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("  \"Ocean Tides Explained\"\n"), "Ocean Tides Explained");
        assert_eq!(clean_title("'Rust Ownership'"), "Rust Ownership");
        assert_eq!(clean_title("   "), FALLBACK_TITLE);
        assert_eq!(clean_title("\"\""), FALLBACK_TITLE);
    }

    #[test]
    fn test_long_title_truncated() {
        let long = "A".repeat(60);
        let title = clean_title(&long);
        assert_eq!(title.chars().count(), 50);
        assert_eq!(title, format!("{}...", "A".repeat(47)));

        let exact = "B".repeat(50);
        assert_eq!(clean_title(&exact), exact);
    }

    #[test]
    fn test_truncation_is_char_based() {
        let long = "潮".repeat(60);
        let title = clean_title(&long);
        assert_eq!(title, format!("{}...", "潮".repeat(47)));
    }

    #[tokio::test]
    async fn test_uses_title_model_and_timeout() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.script(TITLE_MODEL, vec![Script::reply("\"How Tides Work\"")]);

        let title = use_case(&gateway).execute("How do tides work?").await;

        assert_eq!(title, "How Tides Work");
        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model.as_str(), TITLE_MODEL);
        assert_eq!(calls[0].options.timeout, Some(Duration::from_secs(30)));
        assert!(calls[0].messages[0].content.contains("Question: How do tides work?"));
    }

    #[tokio::test]
    async fn test_fallback_on_failure() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.always(
            TITLE_MODEL,
            Script::fail(GatewayError::Http {
                status: 403,
                body: String::new(),
            }),
        );

        assert_eq!(use_case(&gateway).execute("q").await, FALLBACK_TITLE);
    }

    #[tokio::test]
    async fn test_fallback_on_missing_content() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.script(TITLE_MODEL, vec![Script::Reply(CompletionResponse::default())]);

        assert_eq!(use_case(&gateway).execute("q").await, FALLBACK_TITLE);
    }
}
