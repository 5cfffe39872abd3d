//! Application-level configuration.
//!
//! - [`CouncilConfig`] - roster, chairman, title model and call behaviour

pub mod council_config;

pub use council_config::{CouncilConfig, CouncilConfigError};
