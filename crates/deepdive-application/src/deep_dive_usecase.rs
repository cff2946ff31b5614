//! Deep Dive use case implementation.
//!
//! `DeepDiveUseCase` is the surface a presentation layer talks to. It owns the
//! round machinery and the session store, and persists the session after every
//! operation that changes it.
//!
//! Persistence failures are logged and swallowed by the round operations: the
//! caller keeps the in-memory session and can retry with [`DeepDiveUseCase::save_session`].

use deepdive_core::config::RootConfig;
use deepdive_core::error::Result;
use deepdive_core::persona::PersonaId;
use deepdive_core::profile::{ThreadProfile, ThreadProfileCalculator};
use deepdive_core::session::{DeepDiveSession, Exchange, Hypothesis, Phase, Stage};
use deepdive_core::store::KeyValueStore;
use deepdive_core::thread::ThreadId;
use deepdive_infrastructure::SessionStore;
use std::sync::Arc;

use crate::content::ContentGenerator;
use crate::hypothesis::HypothesisSynthesizer;
use crate::round_controller::{AnswerOutcome, RoundController};

/// Result of [`DeepDiveUseCase::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session was created and its opening probes generated.
    Started(DeepDiveSession),
    /// An open or paused session already exists; nothing was created.
    Unfinished(DeepDiveSession),
}

/// Use case for running one Deep Dive investigation at a time.
///
/// # Responsibilities
///
/// - Creating, resuming, pausing and completing the single active session
/// - Delegating round logic to [`RoundController`]
/// - Producing hypotheses and the thread profile at round 4
/// - Persisting the session after each mutation
pub struct DeepDiveUseCase {
    /// Active-slot and history persistence
    store: SessionStore,
    /// Rounds 1-3, scoring, sulks and the debate
    rounds: RoundController,
    /// Round-4 hypotheses
    synthesizer: HypothesisSynthesizer,
    profiles: ThreadProfileCalculator,
}

impl DeepDiveUseCase {
    /// Creates a new `DeepDiveUseCase`.
    ///
    /// # Arguments
    ///
    /// * `store` - Key-value store backing the active session and history
    /// * `content` - Generator for persona lines, with fallback
    /// * `config` - Storage keys and scoring settings
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        content: Arc<ContentGenerator>,
        config: &RootConfig,
    ) -> Self {
        Self {
            store: SessionStore::new(store, &config.storage),
            rounds: RoundController::new(content.clone(), &config.scoring),
            synthesizer: HypothesisSynthesizer::new(content),
            profiles: ThreadProfileCalculator,
        }
    }

    pub fn rounds(&self) -> &RoundController {
        &self.rounds
    }

    async fn persist(&self, session: &mut DeepDiveSession) {
        session.touch();
        if let Err(e) = self.store.save_active(session).await {
            tracing::error!("[DeepDiveUseCase] Failed to save session {}: {}", session.id, e);
        }
    }

    /// Creates and persists an empty session unless an unfinished one exists.
    ///
    /// Unlike [`DeepDiveUseCase::start`], no opening probes are generated.
    pub async fn create_new_session(&self, problem: &str) -> StartOutcome {
        if let Some(existing) = self.unfinished().await {
            return StartOutcome::Unfinished(existing);
        }
        StartOutcome::Started(self.insert(problem).await)
    }

    /// Starts a new investigation unless an unfinished one exists.
    ///
    /// A started session already has its opening probes.
    pub async fn start(&self, problem: &str) -> StartOutcome {
        if let Some(existing) = self.unfinished().await {
            return StartOutcome::Unfinished(existing);
        }
        StartOutcome::Started(self.fresh(problem).await)
    }

    async fn unfinished(&self) -> Option<DeepDiveSession> {
        let existing = self.store.load_active().await?;
        tracing::info!(
            target: "deep_dive",
            session_id = %existing.id,
            phase = %existing.phase,
            "[DeepDiveUseCase] Unfinished session found"
        );
        Some(existing)
    }

    /// Writes a new session to the active slot, overwriting it.
    async fn insert(&self, problem: &str) -> DeepDiveSession {
        let mut session = DeepDiveSession::new(problem.trim());
        self.persist(&mut session).await;
        tracing::info!(
            target: "deep_dive",
            session_id = %session.id,
            "[DeepDiveUseCase] Created session"
        );
        session
    }

    /// Drops the unfinished session (without archiving it) and starts anew.
    pub async fn discard_and_start(&self, problem: &str) -> DeepDiveSession {
        if let Err(e) = self.store.clear_active().await {
            tracing::error!("[DeepDiveUseCase] Failed to discard active session: {}", e);
        }
        self.fresh(problem).await
    }

    async fn fresh(&self, problem: &str) -> DeepDiveSession {
        let mut session = self.insert(problem).await;
        self.generate_opening_gambit(&mut session).await;
        session
    }

    pub async fn generate_opening_gambit(&self, session: &mut DeepDiveSession) -> Vec<Exchange> {
        let probes = self.rounds.generate_opening_gambit(session).await;
        if !probes.is_empty() {
            self.persist(session).await;
        }
        probes
    }

    pub async fn process_answer(
        &self,
        session: &mut DeepDiveSession,
        persona: PersonaId,
        answer: &str,
    ) -> AnswerOutcome {
        let accepted = session.phase.accepts_answers();
        let outcome = self.rounds.process_answer(session, persona, answer).await;
        if accepted {
            self.persist(session).await;
        }
        outcome
    }

    pub async fn generate_follow_up(
        &self,
        session: &mut DeepDiveSession,
        persona: PersonaId,
    ) -> Option<Exchange> {
        let exchange = self.rounds.generate_follow_up(session, persona).await;
        if exchange.is_some() {
            self.persist(session).await;
        }
        exchange
    }

    pub async fn check_for_sulking(&self, session: &mut DeepDiveSession) -> Vec<Exchange> {
        let sulks = self.rounds.check_for_sulking(session);
        if !sulks.is_empty() {
            self.persist(session).await;
        }
        sulks
    }

    /// Starts the council debate when round 3 allows it; otherwise returns nothing.
    pub async fn generate_council_debate(&self, session: &mut DeepDiveSession) -> Vec<Exchange> {
        let lines = self.rounds.debate().generate(session).await;
        if !lines.is_empty() {
            self.persist(session).await;
        }
        lines
    }

    /// Sides with `chosen` (or skips) and moves to round 4.
    pub async fn resolve_debate(
        &self,
        session: &mut DeepDiveSession,
        chosen: Option<ThreadId>,
    ) -> Option<ThreadId> {
        let resolved = self.rounds.debate().resolve(session, chosen);
        if resolved.is_some() {
            self.persist(session).await;
        }
        resolved
    }

    pub fn should_advance_round(&self, session: &DeepDiveSession) -> bool {
        self.rounds.should_advance_round(session)
    }

    pub async fn advance_round(&self, session: &mut DeepDiveSession) -> Option<Vec<Exchange>> {
        let produced = self.rounds.advance_round(session).await?;
        self.persist(session).await;
        Some(produced)
    }

    /// Sets the session's hypotheses once, in round 4, and returns them.
    pub async fn generate_hypotheses(
        &self,
        session: &mut DeepDiveSession,
    ) -> Option<[Hypothesis; 4]> {
        if let Some(existing) = &session.hypotheses {
            return Some(existing.clone());
        }
        let hypotheses = self.synthesizer.synthesize(session).await?;
        session.hypotheses = Some(hypotheses.clone());
        self.persist(session).await;
        tracing::info!(
            target: "deep_dive",
            session_id = %session.id,
            "[DeepDiveUseCase] Hypotheses generated"
        );
        Some(hypotheses)
    }

    pub fn calculate_thread_profile(&self, session: &DeepDiveSession) -> ThreadProfile {
        self.profiles.compute(session)
    }

    /// Writes the session to the active slot.
    pub async fn save_session(&self, session: &mut DeepDiveSession) -> Result<()> {
        session.touch();
        self.store.save_active(session).await
    }

    /// The session in the active slot, if any and readable.
    pub async fn get_active_session(&self) -> Option<DeepDiveSession> {
        self.store.load_active().await
    }

    pub async fn clear_active_session(&self) -> Result<()> {
        self.store.clear_active().await?;
        tracing::info!(target: "deep_dive", "[DeepDiveUseCase] Active session cleared");
        Ok(())
    }

    /// Pauses an open session. Returns `false` if it was not open.
    pub async fn pause_session(&self, session: &mut DeepDiveSession) -> bool {
        let Phase::Open(stage) = session.phase else {
            tracing::debug!(
                target: "deep_dive",
                phase = %session.phase,
                "[DeepDiveUseCase] Nothing to pause"
            );
            return false;
        };
        session.phase = Phase::Paused(stage);
        self.persist(session).await;
        tracing::info!(
            target: "deep_dive",
            session_id = %session.id,
            %stage,
            "[DeepDiveUseCase] Session paused"
        );
        true
    }

    /// Reopens a paused session in the stage it was paused in.
    pub async fn resume_session(&self, session: &mut DeepDiveSession) -> bool {
        let Phase::Paused(stage) = session.phase else {
            tracing::debug!(
                target: "deep_dive",
                phase = %session.phase,
                "[DeepDiveUseCase] Nothing to resume"
            );
            return false;
        };
        session.phase = Phase::Open(stage);
        self.persist(session).await;
        tracing::info!(
            target: "deep_dive",
            session_id = %session.id,
            %stage,
            "[DeepDiveUseCase] Session resumed"
        );
        true
    }

    /// Finishes a round-4 session: hypotheses are filled in if missing, the
    /// session moves to history and the active slot is cleared.
    pub async fn complete_session(&self, session: &mut DeepDiveSession) -> bool {
        if !session.phase.is_open(Stage::Round4) {
            tracing::debug!(
                target: "deep_dive",
                phase = %session.phase,
                "[DeepDiveUseCase] Cannot complete yet"
            );
            return false;
        }
        if session.hypotheses.is_none() {
            self.generate_hypotheses(session).await;
        }

        session.phase = Phase::Complete;
        session.touch();
        if let Err(e) = self.store.archive(session).await {
            tracing::error!("[DeepDiveUseCase] Failed to archive session {}: {}", session.id, e);
        }
        if let Err(e) = self.store.clear_active().await {
            tracing::error!("[DeepDiveUseCase] Failed to clear active session: {}", e);
        }
        tracing::info!(
            target: "deep_dive",
            session_id = %session.id,
            "[DeepDiveUseCase] Session complete"
        );
        true
    }

    /// Completed sessions, oldest first.
    pub async fn list_completed_sessions(&self) -> Vec<DeepDiveSession> {
        self.store.history().await
    }
}
