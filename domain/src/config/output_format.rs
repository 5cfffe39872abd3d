//! Output format value object

use serde::{Deserialize, Serialize};

/// Output format for council results
///
/// This is a domain concept representing how the outcome should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// All three stages plus aggregate rankings
    Full,
    /// Only the chairman's final answer (default)
    #[default]
    Final,
    /// JSON serialization of the whole outcome
    Json,
}
