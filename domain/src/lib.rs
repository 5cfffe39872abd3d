//! Domain layer for llm-council
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A fixed roster of models answers a question in three stages:
//!
//! - **Stage 1**: every council member answers independently
//! - **Stage 2**: every member ranks the anonymized Stage 1 answers
//! - **Stage 3**: a chairman model synthesizes a final answer
//!
//! The pure parts of that flow live here: anonymization labels, ranking
//! extraction from free text, and aggregate rank computation.

pub mod config;
pub mod core;
pub mod council;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{error::DomainError, model::Model, question::Question};
pub use council::{
    AggregateRankingEntry, AnonymizationLabel, CouncilMetadata, CouncilOutcome, CouncilStage,
    CouncilState, LabelMap, MIN_MODELS_FOR_RANKING, StageOneResult, StageThreeResult,
    StageTwoResult, aggregate_rankings, parse_ranking,
};
pub use prompt::PromptTemplate;
pub use session::entities::{Message, Role};
