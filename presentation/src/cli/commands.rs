//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// All three stages, rankings de-anonymized, plus the aggregate table
    Full,
    /// Only the chairman's final answer
    Final,
    /// The complete outcome as JSON
    Json,
}

impl From<council_domain::OutputFormat> for OutputFormat {
    fn from(format: council_domain::OutputFormat) -> Self {
        match format {
            council_domain::OutputFormat::Full => OutputFormat::Full,
            council_domain::OutputFormat::Final => OutputFormat::Final,
            council_domain::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for llm-council
#[derive(Parser, Debug)]
#[command(name = "llm-council")]
#[command(author, version, about = "LLM Council - Multiple LLMs answer, rank each other, and a chairman decides")]
#[command(long_about = r#"
LLM Council sends your question to a council of LLMs and combines their work.

The process has three stages:
1. Individual Responses: every council model answers in parallel
2. Peer Rankings: every model ranks the anonymized answers
3. Final Synthesis: a chairman model writes the final answer

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./council.toml      Project-level config
3. ~/.config/llm-council/config.toml   Global config

The API key is read from OPENROUTER_API_KEY unless configured otherwise.

Example:
  llm-council "What's the best way to handle errors in Rust?"
  llm-council -m openai/gpt-5.1 -m x-ai/grok-4 --chairman openai/gpt-5.1 "Compare async runtimes"
  llm-council --output full --web-search "What changed in the latest Rust release?"
"#)]
pub struct Cli {
    /// The question to ask the council
    pub question: Option<String>,

    /// Models to include in the council (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Model to use as chairman for the final synthesis
    #[arg(long, value_name = "MODEL")]
    pub chairman: Option<String>,

    /// Enable provider web search for the first stage
    #[arg(long)]
    pub web_search: bool,

    /// Output format (defaults to the configured format, then `final`)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Also generate and print a short conversation title
    #[arg(long)]
    pub title: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::parse_from([
            "llm-council",
            "-m",
            "a/one",
            "--model",
            "b/two",
            "--chairman",
            "c/three",
            "--web-search",
            "-o",
            "json",
            "-vv",
            "Why?",
        ]);
        assert_eq!(cli.model, vec!["a/one", "b/two"]);
        assert_eq!(cli.chairman.as_deref(), Some("c/three"));
        assert!(cli.web_search);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.question.as_deref(), Some("Why?"));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["llm-council", "q"]);
        assert!(cli.model.is_empty());
        assert!(cli.output.is_none());
        assert!(!cli.title);
        assert!(!cli.quiet);
    }
}
