//! Console output formatter for council outcomes

use colored::Colorize;
use council_domain::{CouncilOutcome, CouncilStage};

/// Formats council outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete outcome
    ///
    /// Stage 2 rankings are shown de-anonymized: each `Response X` label is
    /// replaced by the bold short name of the model behind it.
    pub fn format(question: &str, outcome: &CouncilOutcome) -> String {
        let mut output = String::new();
        let labels = &outcome.metadata.label_to_model;

        // Header
        output.push_str(&Self::header("LLM Council Results"));
        output.push('\n');

        output.push_str(&format!("{} {}\n\n", "Question:".cyan().bold(), question));

        if let Some(warning) = &outcome.metadata.warning {
            output.push_str(&format!("{} {}\n\n", "Warning:".yellow().bold(), warning));
        }

        // Stage 1: Individual Responses
        output.push_str(&Self::section_header(CouncilStage::Collect.display_name()));
        for result in &outcome.stage1 {
            let label = labels
                .label_for(&result.model)
                .map(|l| format!(" ({})", l))
                .unwrap_or_default();
            output.push_str(&format!(
                "\n{}\n{}\n",
                format!("── {}{} ──", result.model, label).yellow().bold(),
                result.response
            ));
        }

        // Stage 2: Peer Rankings (if any)
        if !outcome.stage2.is_empty() {
            output.push_str(&Self::section_header(CouncilStage::Rank.display_name()));
            for ranking in &outcome.stage2 {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── Ranked by {} ──", ranking.model).yellow().bold(),
                    labels.deanonymize(&ranking.ranking)
                ));

                let parsed: Vec<String> = ranking
                    .parsed_ranking
                    .iter()
                    .enumerate()
                    .map(|(i, label)| {
                        let name = labels
                            .model_for(label)
                            .map(|m| m.short_name().to_string())
                            .unwrap_or_else(|| label.to_string());
                        format!("{}. {}", i + 1, name)
                    })
                    .collect();
                if !parsed.is_empty() {
                    output.push_str(&format!(
                        "{} {}\n",
                        "Extracted ranking:".dimmed(),
                        parsed.join(", ")
                    ));
                }
            }
        }

        // Aggregate rankings (if any)
        if !outcome.metadata.aggregate_rankings.is_empty() {
            output.push_str(&Self::section_header("Aggregate Rankings (Street Cred)"));
            for (i, entry) in outcome.metadata.aggregate_rankings.iter().enumerate() {
                output.push_str(&format!(
                    "  {}. {:<40} avg {:.2}  ({} votes)\n",
                    i + 1,
                    entry.model.to_string(),
                    entry.average_rank,
                    entry.rankings_count
                ));
            }
        }

        // Stage 3: Final Synthesis
        output.push_str(&Self::section_header(CouncilStage::Synthesize.display_name()));
        let chairman = format!("Chairman: {}", outcome.stage3.model);
        let chairman = if outcome.stage3.is_error() {
            chairman.red().bold()
        } else {
            chairman.yellow().bold()
        };
        output.push_str(&format!("\n{}\n\n{}\n", chairman, outcome.stage3.response));

        if !outcome.metadata.failed_models.is_empty() {
            output.push_str(&format!(
                "\n{} {}\n",
                "Failed models:".red().bold(),
                Self::join_models(outcome)
            ));
        }

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(outcome: &CouncilOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final answer only (concise output)
    pub fn format_final_only(question: &str, outcome: &CouncilOutcome) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== LLM Council Conclusion ===".cyan().bold()
        ));

        output.push_str(&format!("{} {}\n\n", "Q:".bold(), question));

        let consulted: Vec<&str> = outcome.stage1.iter().map(|r| r.model.as_str()).collect();
        if !consulted.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Models consulted:".dimmed(),
                consulted.join(", ")
            ));
        }
        if let Some(warning) = &outcome.metadata.warning {
            output.push_str(&format!("{} {}\n", "Warning:".yellow(), warning));
        }
        output.push('\n');

        output.push_str(&outcome.stage3.response);
        output.push('\n');

        output
    }

    fn join_models(outcome: &CouncilOutcome) -> String {
        outcome
            .metadata
            .failed_models
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
