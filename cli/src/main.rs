//! CLI entrypoint for LLM Council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use council_application::ports::progress::ProgressNotifier;
use council_application::{GenerateTitleUseCase, RunCouncilInput, RunCouncilUseCase};
use council_domain::Question;
use council_infrastructure::{ConfigLoader, FileConfig, OpenRouterGateway};
use council_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting LLM Council");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    // === Configuration ===
    let mut file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {e}"))?
    };
    apply_cli_overrides(&mut file_config, &cli);

    let council_config = file_config
        .to_council_config()
        .context("Invalid configuration")?;

    if !file_config.output.color {
        colored::control::set_override(false);
    }

    let question = match cli.question.as_deref() {
        Some(q) => Question::new(q)?,
        None => bail!("Question is required."),
    };

    // === Dependency Injection ===
    let gateway = Arc::new(OpenRouterGateway::from_env(
        file_config.openrouter.api_url.as_str(),
        &file_config.openrouter.api_key_env,
    )?);

    let title_use_case = cli
        .title
        .then(|| GenerateTitleUseCase::new(Arc::clone(&gateway), &council_config));
    let use_case = RunCouncilUseCase::new(gateway, council_config)?;

    let input = RunCouncilInput::new(question.clone()).with_web_search(file_config.council.web_search);

    let run = async {
        match progress_for(cli.quiet, std::io::stderr().is_terminal()) {
            Some(progress) => use_case.execute_with_progress(input, progress.as_ref()).await,
            None => use_case.execute(input).await,
        }
    };
    let title = async {
        match &title_use_case {
            Some(uc) => Some(uc.execute(question.content()).await),
            None => None,
        }
    };
    let (outcome, title) = tokio::join!(run, title);

    let format = cli
        .output
        .or(file_config.output.format.map(OutputFormat::from))
        .unwrap_or(OutputFormat::Final);

    if let Some(title) = title {
        if format == OutputFormat::Json {
            eprintln!("Title: {}", title);
        } else {
            println!("Title: {}\n", title);
        }
    }

    let output = match format {
        OutputFormat::Full => ConsoleFormatter::format(question.content(), &outcome),
        OutputFormat::Final => ConsoleFormatter::format_final_only(question.content(), &outcome),
        OutputFormat::Json => ConsoleFormatter::format_json(&outcome),
    };

    println!("{}", output);

    Ok(())
}

/// Initialize logging based on verbosity level
///
/// `RUST_LOG` wins over `-v` when set. Logs go to stderr, and also to
/// `log_file` when one is given.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Progress bars on a terminal, plain lines otherwise, nothing when quiet
fn progress_for(quiet: bool, stderr_is_terminal: bool) -> Option<Box<dyn ProgressNotifier>> {
    if quiet {
        None
    } else if stderr_is_terminal {
        Some(Box::new(ProgressReporter::new()))
    } else {
        Some(Box::new(SimpleProgress))
    }
}

/// Apply `-m`, `--chairman` and `--web-search` on top of the loaded file config
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if !cli.model.is_empty() {
        config.council.models = cli.model.clone();
    }
    if let Some(chairman) = &cli.chairman {
        config.council.chairman = chairman.clone();
    }
    if cli.web_search {
        config.council.web_search = true;
    }
}
