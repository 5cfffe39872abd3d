//! Council configuration from TOML (`[council]` section)

use council_domain::Model;
use serde::{Deserialize, Serialize};

/// Raw council configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Council members, as provider model identifiers
    pub models: Vec<String>,
    /// Model that writes the final synthesis
    pub chairman: String,
    /// Model used to generate conversation titles
    pub title_model: String,
    /// Enable provider web search for Stage 1
    pub web_search: bool,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            models: Model::default_council()
                .into_iter()
                .map(|m| m.as_str().to_string())
                .collect(),
            chairman: Model::default_chairman().as_str().to_string(),
            title_model: Model::default_title_model().as_str().to_string(),
            web_search: false,
        }
    }
}
