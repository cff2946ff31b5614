//! Exchange types: one line said by a persona during the investigation.

use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::persona::PersonaId;

/// What kind of line an exchange is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExchangeKind {
    /// Opening question (rounds 1 and 3).
    Probe,
    /// Deeper question on an active thread (round 2).
    FollowUp,
    /// Pointed follow-up for a thread with a strong signal.
    Interrupt,
    /// Line in the round-3 council debate.
    Debate,
    /// Display-only complaint from an ignored persona.
    Sulk,
}

impl ExchangeKind {
    /// Whether the user is expected to reply to this kind.
    pub fn is_question(self) -> bool {
        matches!(self, Self::Probe | Self::FollowUp | Self::Interrupt)
    }
}

/// One persona line, plus the user's reply when it was a question.
///
/// Exchanges are append-only; the only mutation allowed after creation is
/// attaching `user_answer` once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub id: String,
    pub round: u8,
    pub persona_id: PersonaId,
    pub kind: ExchangeKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    /// Creation time (ISO 8601 format)
    pub timestamp: String,
}

impl Exchange {
    pub fn new(
        round: u8,
        persona_id: PersonaId,
        kind: ExchangeKind,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            round,
            persona_id,
            kind,
            content: content.into(),
            user_answer: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// A question still waiting for the user.
    pub fn is_open(&self) -> bool {
        self.kind.is_question() && self.user_answer.is_none()
    }

    pub fn is_answered(&self) -> bool {
        self.user_answer.is_some()
    }

    /// Attaches the user's reply. Returns `false` if already answered or not a question.
    pub fn attach_answer(&mut self, answer: impl Into<String>) -> bool {
        if !self.is_open() {
            return false;
        }
        self.user_answer = Some(answer.into());
        true
    }
}
