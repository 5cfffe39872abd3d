//! Configuration file loading for llm-council
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./council.toml` or `./.council.toml`
//! 3. Global: `$XDG_CONFIG_HOME/llm-council/config.toml`
//! 4. `LLM_COUNCIL_*` environment variables
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileCouncilConfig, FileGatewayConfig,
    FileOpenRouterConfig, FileOutputConfig, FileOutputFormat,
};
pub use loader::ConfigLoader;
