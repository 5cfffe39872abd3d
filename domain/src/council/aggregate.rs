//! Aggregate ranking across all peer rankings.

use crate::core::model::Model;
use crate::council::label::LabelMap;
use crate::council::value_objects::StageTwoResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Average position a model received from its peers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRankingEntry {
    pub model: Model,
    /// Mean of 1-based positions, rounded to 2 decimals (ties to even). Lower is better.
    pub average_rank: f64,
    /// Number of rankings that placed this model
    pub rankings_count: usize,
}

/// Compute the average rank of every model that appears in any ranking.
///
/// Labels not present in `labels` are ignored, as are models nobody
/// ranked. The result is sorted by ascending average rank; ties keep the
/// order in which each model first received a position (walking rankings
/// in order, then positions in order). The sort is stable, so the same
/// input always yields the same order.
pub fn aggregate_rankings(
    rankings: &[StageTwoResult],
    labels: &LabelMap,
) -> Vec<AggregateRankingEntry> {
    let mut positions: Vec<(Model, Vec<usize>)> = Vec::new();
    let mut index: HashMap<Model, usize> = HashMap::new();

    for ranking in rankings {
        for (i, label) in ranking.parsed_ranking.iter().enumerate() {
            let Some(model) = labels.model_for(label) else {
                continue;
            };
            let slot = *index.entry(model.clone()).or_insert_with(|| {
                positions.push((model.clone(), Vec::new()));
                positions.len() - 1
            });
            positions[slot].1.push(i + 1);
        }
    }

    let mut entries: Vec<AggregateRankingEntry> = positions
        .into_iter()
        .map(|(model, ranks)| {
            let mean = ranks.iter().sum::<usize>() as f64 / ranks.len() as f64;
            AggregateRankingEntry {
                model,
                average_rank: round2(mean),
                rankings_count: ranks.len(),
            }
        })
        .collect();

    entries.sort_by(|a, b| a.average_rank.total_cmp(&b.average_rank));
    entries
}

/// Round to 2 decimals, exact halves going to the even digit
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
