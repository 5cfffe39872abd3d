//! Council value objects - immutable result types for a council run.
//!
//! - [`StageOneResult`] - one model's answer to the question
//! - [`StageTwoResult`] - one model's ranking of the anonymized answers
//! - [`StageThreeResult`] - the chairman's synthesis (or an error marker)
//! - [`CouncilMetadata`] - label map, aggregate ranks, failures
//! - [`CouncilOutcome`] - everything above, as returned to callers

use crate::core::model::Model;
use crate::council::MIN_MODELS_FOR_RANKING;
use crate::council::aggregate::AggregateRankingEntry;
use crate::council::label::{AnonymizationLabel, LabelMap};
use crate::council::stage::CouncilState;
use serde::{Deserialize, Serialize};

const ALL_FAILED_MESSAGE: &str = "All models failed to respond after retrying. This may be due to API issues or rate limiting. Please try again in a few minutes.";

const SYNTHESIS_FAILED_MESSAGE: &str = "Error: Unable to generate final synthesis.";

/// A successful Stage 1 answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOneResult {
    pub model: Model,
    pub response: String,
}

impl StageOneResult {
    pub fn new(model: Model, response: impl Into<String>) -> Self {
        Self {
            model,
            response: response.into(),
        }
    }
}

/// A successful Stage 2 ranking
///
/// `parsed_ranking` may be shorter than the number of labels, or empty,
/// when the ranker ignored the requested format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTwoResult {
    pub model: Model,
    /// Full ranking text as the model wrote it (still anonymized)
    pub ranking: String,
    pub parsed_ranking: Vec<AnonymizationLabel>,
}

impl StageTwoResult {
    pub fn new(
        model: Model,
        ranking: impl Into<String>,
        parsed_ranking: Vec<AnonymizationLabel>,
    ) -> Self {
        Self {
            model,
            ranking: ranking.into(),
            parsed_ranking,
        }
    }
}

/// The Stage 3 answer
///
/// Always present. When the pipeline stops early or the chairman fails,
/// `response` carries an explanation instead of a synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageThreeResult {
    pub model: Model,
    pub response: String,
}

impl StageThreeResult {
    pub fn new(model: Model, response: impl Into<String>) -> Self {
        Self {
            model,
            response: response.into(),
        }
    }

    /// Marker result when no model answered Stage 1
    pub fn all_failed() -> Self {
        Self::new(Model::error_marker(), ALL_FAILED_MESSAGE)
    }

    /// Marker result when too few models answered Stage 1 to rank
    pub fn insufficient_quorum(responded: &[StageOneResult], failed: &[Model]) -> Self {
        let names = join_models(responded.iter().map(|r| &r.model));
        let failed = join_models(failed.iter());
        Self::new(
            Model::error_marker(),
            format!(
                "Only {} model(s) responded ({}). At least {} models are needed for ranking. The remaining models failed: {}.",
                responded.len(),
                names,
                MIN_MODELS_FOR_RANKING,
                failed
            ),
        )
    }

    /// Result attributed to the chairman when its call failed
    pub fn synthesis_failed(chairman: Model) -> Self {
        Self::new(chairman, SYNTHESIS_FAILED_MESSAGE)
    }

    /// Returns `true` if this is one of the fixed error results
    pub fn is_error(&self) -> bool {
        self.model == Model::error_marker() || self.response == SYNTHESIS_FAILED_MESSAGE
    }
}

/// Run metadata accompanying the three stage results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CouncilMetadata {
    pub label_to_model: LabelMap,
    pub aggregate_rankings: Vec<AggregateRankingEntry>,
    /// Models that failed at any stage, de-duplicated, in first-failure order
    pub failed_models: Vec<Model>,
    /// Set when Stage 1 produced results but too few to rank
    #[serde(default)]
    pub partial_stage1: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl CouncilMetadata {
    /// Metadata for a run that reached Stage 3
    ///
    /// `failures` may contain repeats (a model failing in several stages);
    /// they are collapsed here. A warning is attached when any failed.
    pub fn completed(
        label_to_model: LabelMap,
        aggregate_rankings: Vec<AggregateRankingEntry>,
        failures: impl IntoIterator<Item = Model>,
    ) -> Self {
        let failed_models = dedup_in_order(failures);
        let warning = (!failed_models.is_empty()).then(|| {
            format!(
                "Some models failed during the council process: {}",
                join_models(failed_models.iter())
            )
        });
        Self {
            label_to_model,
            aggregate_rankings,
            failed_models,
            partial_stage1: false,
            warning,
        }
    }
}

/// Complete result of a council run
///
/// Every field is always present; collections may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilOutcome {
    /// Terminal state the run ended in
    pub state: CouncilState,
    pub stage1: Vec<StageOneResult>,
    pub stage2: Vec<StageTwoResult>,
    pub stage3: StageThreeResult,
    pub metadata: CouncilMetadata,
}

impl CouncilOutcome {
    /// Outcome when no council member answered Stage 1
    pub fn all_failed(failed: Vec<Model>) -> Self {
        Self {
            state: CouncilState::AllFailed,
            stage1: Vec::new(),
            stage2: Vec::new(),
            stage3: StageThreeResult::all_failed(),
            metadata: CouncilMetadata {
                failed_models: dedup_in_order(failed),
                ..CouncilMetadata::default()
            },
        }
    }

    /// Outcome when Stage 1 succeeded for fewer members than ranking needs
    pub fn insufficient_quorum(stage1: Vec<StageOneResult>, failed: Vec<Model>) -> Self {
        let failed = dedup_in_order(failed);
        Self {
            state: CouncilState::InsufficientQuorum,
            stage3: StageThreeResult::insufficient_quorum(&stage1, &failed),
            stage1,
            stage2: Vec::new(),
            metadata: CouncilMetadata {
                failed_models: failed,
                partial_stage1: true,
                ..CouncilMetadata::default()
            },
        }
    }

    /// Outcome of a run that went through all three stages
    pub fn completed(
        stage1: Vec<StageOneResult>,
        stage2: Vec<StageTwoResult>,
        stage3: StageThreeResult,
        metadata: CouncilMetadata,
    ) -> Self {
        Self {
            state: CouncilState::Done,
            stage1,
            stage2,
            stage3,
            metadata,
        }
    }

    /// Returns `true` if any model failed during the run
    pub fn has_failures(&self) -> bool {
        !self.metadata.failed_models.is_empty()
    }
}

fn dedup_in_order(models: impl IntoIterator<Item = Model>) -> Vec<Model> {
    let mut out: Vec<Model> = Vec::new();
    for model in models {
        if !out.contains(&model) {
            out.push(model);
        }
    }
    out
}

fn join_models<'a>(models: impl Iterator<Item = &'a Model>) -> String {
    models.map(Model::as_str).collect::<Vec<_>>().join(", ")
}
