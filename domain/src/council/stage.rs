//! Council stages and pipeline states

use serde::{Deserialize, Serialize};

/// One of the three dispatch stages of a council run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouncilStage {
    /// Every council member answers the question independently
    Collect,
    /// Every council member ranks the anonymized answers
    Rank,
    /// The chairman synthesizes the final answer
    Synthesize,
}

impl CouncilStage {
    pub fn as_str(&self) -> &str {
        match self {
            CouncilStage::Collect => "collect",
            CouncilStage::Rank => "rank",
            CouncilStage::Synthesize => "synthesize",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            CouncilStage::Collect => "Stage 1: Individual Responses",
            CouncilStage::Rank => "Stage 2: Peer Rankings",
            CouncilStage::Synthesize => "Stage 3: Final Synthesis",
        }
    }
}

impl std::fmt::Display for CouncilStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// State of a council pipeline run
///
/// ```text
/// Stage1 ─► Stage2 ─► Stage3 ─► Done
///   │
///   ├─► AllFailed            (no Stage 1 successes)
///   └─► InsufficientQuorum   (fewer than MIN_MODELS_FOR_RANKING successes)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouncilState {
    Stage1,
    Stage2,
    Stage3,
    Done,
    AllFailed,
    InsufficientQuorum,
}

impl CouncilState {
    /// Terminal states end the run; no further dispatch happens
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CouncilState::Done | CouncilState::AllFailed | CouncilState::InsufficientQuorum
        )
    }

    /// Next state on the success path
    ///
    /// Terminal states stay where they are. Leaving `Stage1` early is
    /// decided by [`after_collect`](Self::after_collect).
    pub fn advance(self) -> Self {
        match self {
            CouncilState::Stage1 => CouncilState::Stage2,
            CouncilState::Stage2 => CouncilState::Stage3,
            CouncilState::Stage3 => CouncilState::Done,
            terminal => terminal,
        }
    }

    /// State after Stage 1 given the number of successful responses
    pub fn after_collect(successes: usize, quorum: usize) -> Self {
        if successes == 0 {
            CouncilState::AllFailed
        } else if successes < quorum {
            CouncilState::InsufficientQuorum
        } else {
            CouncilState::Stage2
        }
    }
}
