//! Ranking extraction from free-form Stage 2 output.
//!
//! Rankers are asked to end with a `FINAL RANKING:` section containing a
//! numbered list of labels. Models don't always comply, so extraction
//! degrades in steps:
//!
//! | Input | Strategy |
//! |-------|----------|
//! | marker present, numbered lines after it | numbered `N. Response X` lines, in order |
//! | marker present, no numbered lines | every `Response X` after the marker |
//! | marker absent | every `Response X` in the whole text |
//!
//! Extraction is total: any input yields a (possibly empty) list.

use crate::council::label::AnonymizationLabel;
use regex::Regex;
use std::sync::LazyLock;

/// Literal marker that opens the ranking section (case-sensitive)
pub const FINAL_RANKING_MARKER: &str = "FINAL RANKING:";

static NUMBERED_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\s*(Response [A-Z])").expect("valid numbered regex"));

static ANY_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Response [A-Z]").expect("valid label regex"));

/// Extract the ordered list of labels a ranker produced.
///
/// Only the text after the first `FINAL RANKING:` is considered when the
/// marker exists; later repetitions of the marker are part of that region.
/// Duplicates are preserved.
///
/// # Examples
///
/// ```
/// use council_domain::council::ranking::parse_ranking;
///
/// let text = "B is best.\n\nFINAL RANKING:\n1. Response B\n2. Response A";
/// let labels: Vec<String> = parse_ranking(text).iter().map(|l| l.to_string()).collect();
/// assert_eq!(labels, vec!["Response B", "Response A"]);
///
/// assert!(parse_ranking("").is_empty());
/// ```
pub fn parse_ranking(text: &str) -> Vec<AnonymizationLabel> {
    let Some(pos) = text.find(FINAL_RANKING_MARKER) else {
        return all_labels(text);
    };
    let region = &text[pos + FINAL_RANKING_MARKER.len()..];

    let numbered: Vec<AnonymizationLabel> = NUMBERED_ENTRY
        .captures_iter(region)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| AnonymizationLabel::parse(m.as_str()))
        .collect();

    if numbered.is_empty() {
        all_labels(region)
    } else {
        numbered
    }
}

fn all_labels(text: &str) -> Vec<AnonymizationLabel> {
    ANY_LABEL
        .find_iter(text)
        .filter_map(|m| AnonymizationLabel::parse(m.as_str()))
        .collect()
}
