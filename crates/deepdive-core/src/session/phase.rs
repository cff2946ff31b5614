//! Investigation phase: the single source of truth for where a session is.
//!
//! Round number, "debate in progress", "paused" and "complete" are all
//! derived from [`Phase`], so contradictory combinations cannot be stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A step of the investigation while it is not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// One opening probe per persona; the user answers one.
    Round1,
    /// Follow-ups on threads that have depth.
    Round2,
    /// Last chance for inactive threads to join before the debate.
    Round3Probe,
    /// Council debate running; waiting for the user to pick a concern.
    Round3Debate,
    /// Terminal analysis: hypotheses and profile.
    Round4,
}

impl Stage {
    pub fn round(self) -> u8 {
        match self {
            Stage::Round1 => 1,
            Stage::Round2 => 2,
            Stage::Round3Probe | Stage::Round3Debate => 3,
            Stage::Round4 => 4,
        }
    }

    /// Whether the user can submit answers in this stage.
    pub fn accepts_answers(self) -> bool {
        matches!(self, Stage::Round1 | Stage::Round2 | Stage::Round3Probe)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Round1 => write!(f, "round 1 (opening)"),
            Stage::Round2 => write!(f, "round 2 (follow-up)"),
            Stage::Round3Probe => write!(f, "round 3 (probe)"),
            Stage::Round3Debate => write!(f, "round 3 (debate)"),
            Stage::Round4 => write!(f, "round 4 (hypotheses)"),
        }
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "stage", rename_all = "snake_case")]
pub enum Phase {
    /// Investigation in progress.
    Open(Stage),
    /// Saved for later; resumes into the same stage.
    Paused(Stage),
    /// Finished after round 4.
    Complete,
}

impl Phase {
    pub fn round(self) -> u8 {
        match self {
            Phase::Open(stage) | Phase::Paused(stage) => stage.round(),
            Phase::Complete => 4,
        }
    }

    /// The stage, if the session is open and not paused.
    pub fn open_stage(self) -> Option<Stage> {
        match self {
            Phase::Open(stage) => Some(stage),
            _ => None,
        }
    }

    pub fn is_open(self, stage: Stage) -> bool {
        self == Phase::Open(stage)
    }

    pub fn is_paused(self) -> bool {
        matches!(self, Phase::Paused(_))
    }

    pub fn is_complete(self) -> bool {
        self == Phase::Complete
    }

    pub fn debate_in_progress(self) -> bool {
        self.is_open(Stage::Round3Debate)
    }

    pub fn accepts_answers(self) -> bool {
        self.open_stage().is_some_and(Stage::accepts_answers)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Open(stage) => write!(f, "{}", stage),
            Phase::Paused(stage) => write!(f, "paused in {}", stage),
            Phase::Complete => write!(f, "complete"),
        }
    }
}
