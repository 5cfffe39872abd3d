//! Council domain
//!
//! Pure logic for the three-stage council flow. Nothing here performs I/O;
//! the application layer drives dispatch and feeds results through these
//! types.
//!
//! # Flow
//!
//! ```text
//! question ─► Stage 1 (collect) ─► quorum check ─┬─► AllFailed
//!                                                ├─► InsufficientQuorum
//!                                                ▼
//!             Stage 2 (rank, anonymized) ─► aggregate
//!                                                ▼
//!                          Stage 3 (chairman) ─► Done
//! ```
//!
//! - [`label`] - anonymization labels and the label → model map
//! - [`ranking`] - extraction of `FINAL RANKING:` lists from free text
//! - [`aggregate`] - average rank per model across all peer rankings
//! - [`stage`] - stage identifiers and pipeline states
//! - [`value_objects`] - per-stage results and the final outcome

pub mod aggregate;
pub mod label;
pub mod ranking;
pub mod stage;
pub mod value_objects;

pub use aggregate::{AggregateRankingEntry, aggregate_rankings};
pub use label::{AnonymizationLabel, LabelMap};
pub use ranking::{FINAL_RANKING_MARKER, parse_ranking};
pub use stage::{CouncilStage, CouncilState};
pub use value_objects::{
    CouncilMetadata, CouncilOutcome, StageOneResult, StageThreeResult, StageTwoResult,
};

/// Minimum number of Stage 1 successes required before peer ranking runs
pub const MIN_MODELS_FOR_RANKING: usize = 2;
