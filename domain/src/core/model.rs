//! Model value object representing a backend LLM

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a backend model (Value Object)
///
/// The identifier is opaque to the council: it is whatever string the
/// provider routes on (e.g. `"openai/gpt-5.1"`). It is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Model(String);

impl Model {
    /// Create a model identifier, rejecting empty or whitespace-only names
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidModel(
                "model identifier cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display name without the provider prefix
    ///
    /// `"openai/gpt-5.1"` becomes `"gpt-5.1"`; identifiers without a `/`
    /// are returned unchanged.
    pub fn short_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Marker used as the Stage 3 author when no chairman answer exists
    pub fn error_marker() -> Model {
        Model("error".to_string())
    }

    /// Default council roster
    pub fn default_council() -> Vec<Model> {
        [
            "openai/gpt-5.1",
            "google/gemini-3-pro-preview",
            "anthropic/claude-sonnet-4.5",
            "x-ai/grok-4",
        ]
        .into_iter()
        .map(|id| Model(id.to_string()))
        .collect()
    }

    /// Default chairman for Stage 3 synthesis
    pub fn default_chairman() -> Model {
        Model("google/gemini-3-pro-preview".to_string())
    }

    /// Fast, cheap model used for conversation titles
    pub fn default_title_model() -> Model {
        Model("google/gemini-2.5-flash".to_string())
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Model {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::new(s)
    }
}

impl AsRef<str> for Model {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
