//! The persisted Deep Dive session record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::exchange::{Exchange, ExchangeKind};
use super::hypothesis::Hypothesis;
use super::phase::{Phase, Stage};
use crate::persona::PersonaId;
use crate::thread::{Thread, ThreadId};

/// Current on-disk format of [`DeepDiveSession`].
///
/// Stored sessions carrying any other version are treated as unreadable.
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// One investigation of one problem statement.
///
/// This is plain data: derived views such as the thread profile are computed
/// on read and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepDiveSession {
    pub version: u32,
    pub id: String,
    pub problem: String,
    pub phase: Phase,
    pub threads: BTreeMap<ThreadId, Thread>,
    pub exchanges: Vec<Exchange>,
    /// Set once, when round 4 is reached, in thread priority order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypotheses: Option<[Hypothesis; 4]>,
    /// Creation time (ISO 8601 format)
    pub created_at: String,
    /// Last update time (ISO 8601 format)
    pub updated_at: String,
}

impl DeepDiveSession {
    /// Creates a fresh session in round 1 with all four threads inactive.
    pub fn new(problem: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: SESSION_FORMAT_VERSION,
            id: Uuid::new_v4().to_string(),
            problem: problem.into(),
            phase: Phase::Open(Stage::Round1),
            threads: ThreadId::ALL
                .into_iter()
                .map(|id| (id, Thread::new(id)))
                .collect(),
            exchanges: Vec::new(),
            hypotheses: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn round(&self) -> u8 {
        self.phase.round()
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    /// Returns the thread state, recreating a missing entry on the fly.
    pub fn thread(&self, id: ThreadId) -> Thread {
        self.threads.get(&id).cloned().unwrap_or_else(|| Thread::new(id))
    }

    pub fn thread_mut(&mut self, id: ThreadId) -> &mut Thread {
        self.threads.entry(id).or_insert_with(|| Thread::new(id))
    }

    pub fn depth(&self, id: ThreadId) -> u32 {
        self.threads.get(&id).map_or(0, |t| t.depth)
    }

    pub fn is_active(&self, id: ThreadId) -> bool {
        self.threads.get(&id).is_some_and(|t| t.active)
    }

    /// Active threads in priority order.
    pub fn active_threads(&self) -> Vec<ThreadId> {
        ThreadId::ALL
            .into_iter()
            .filter(|id| self.is_active(*id))
            .collect()
    }

    pub fn exchanges_in_round(&self, round: u8) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter().filter(move |e| e.round == round)
    }

    /// Index of the oldest open question from `persona` in the current round.
    pub fn open_question_for(&self, persona: PersonaId) -> Option<usize> {
        let round = self.round();
        self.exchanges
            .iter()
            .position(|e| e.round == round && e.persona_id == persona && e.is_open())
    }

    /// Whether `persona` has an open question of `kind` in the current round.
    pub fn has_open(&self, persona: PersonaId, kind: ExchangeKind) -> bool {
        self.exchanges_in_round(self.round())
            .any(|e| e.persona_id == persona && e.kind == kind && e.is_open())
    }

    /// Whether `persona` answered anything in `round`.
    pub fn answered_in_round(&self, persona: PersonaId, round: u8) -> bool {
        self.exchanges_in_round(round)
            .any(|e| e.persona_id == persona && e.is_answered())
    }

    /// Every answer the user gave to `persona`, oldest first.
    pub fn answers_for(&self, persona: PersonaId) -> Vec<&str> {
        self.exchanges
            .iter()
            .filter(|e| e.persona_id == persona)
            .filter_map(|e| e.user_answer.as_deref())
            .collect()
    }

    /// The most recent answer given in the session, if any.
    pub fn latest_answer(&self) -> Option<&str> {
        self.exchanges
            .iter()
            .rev()
            .find_map(|e| e.user_answer.as_deref())
    }

    /// Answers that ground a thread's hypothesis: the persona's own, or, for
    /// a cross-activated thread, everything the user said. Blank answers are
    /// skipped; a dormant thread has none.
    pub fn grounding_answers(&self, thread: ThreadId) -> Vec<&str> {
        let own: Vec<&str> = self
            .answers_for(thread.persona())
            .into_iter()
            .filter(|a| !a.trim().is_empty())
            .collect();
        if !own.is_empty() || !self.is_active(thread) {
            return own;
        }
        self.exchanges
            .iter()
            .filter_map(|e| e.user_answer.as_deref())
            .filter(|a| !a.trim().is_empty())
            .collect()
    }

    /// Whether `thread` has enough to say for a grounded hypothesis.
    ///
    /// Derived on read; sessions never store it.
    pub fn is_informed(&self, thread: ThreadId) -> bool {
        self.is_active(thread) && !self.grounding_answers(thread).is_empty()
    }

    pub fn push(&mut self, exchange: Exchange) {
        self.exchanges.push(exchange);
    }

    /// Checks the structural invariants a loaded session must satisfy.
    pub fn is_well_formed(&self) -> bool {
        self.version == SESSION_FORMAT_VERSION
            && ThreadId::ALL.iter().all(|id| self.threads.contains_key(id))
            && self.exchanges.iter().all(|e| (1..=4).contains(&e.round))
            && self.exchanges.iter().all(|e| e.round <= self.round())
    }
}
