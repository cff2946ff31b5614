//! Round progression: who asks what, when a round is done, what comes next.

use deepdive_core::config::ScoringConfig;
use deepdive_core::persona::PersonaId;
use deepdive_core::scoring::ThreadActivationScorer;
use deepdive_core::session::{DeepDiveSession, Exchange, ExchangeKind, Phase, Stage};
use deepdive_core::sulk::SulkDetector;
use deepdive_core::thread::ThreadId;
use deepdive_core::triage;
use futures::future::join_all;
use std::sync::Arc;

use crate::content::ContentGenerator;
use crate::debate::DebateOrchestrator;

/// What happened when an answer was processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Threads that became active because of this answer.
    pub activated: Vec<ThreadId>,
    /// Follow-ups generated for newly activated threads (round 2 only).
    pub follow_ups: Vec<Exchange>,
}

/// Drives a session through rounds 1 to 3.
///
/// Every operation is a no-op outside the phase it belongs to, so callers
/// can invoke them eagerly without checking the phase first.
#[derive(Clone)]
pub struct RoundController {
    scorer: ThreadActivationScorer,
    sulks: SulkDetector,
    debate: DebateOrchestrator,
    content: Arc<ContentGenerator>,
}

impl RoundController {
    pub fn new(content: Arc<ContentGenerator>, scoring: &ScoringConfig) -> Self {
        Self {
            scorer: ThreadActivationScorer::new(scoring),
            sulks: SulkDetector,
            debate: DebateOrchestrator::new(content.clone()),
            content,
        }
    }

    pub fn debate(&self) -> &DebateOrchestrator {
        &self.debate
    }

    /// Appends the round-1 probes, one per persona, generated concurrently.
    ///
    /// Runs once: returns nothing if round-1 probes already exist. A problem
    /// that mentions self-harm or abuse gets a single safety message instead.
    pub async fn generate_opening_gambit(&self, session: &mut DeepDiveSession) -> Vec<Exchange> {
        if !session.phase.is_open(Stage::Round1) {
            return Vec::new();
        }
        let already = session
            .exchanges_in_round(1)
            .any(|e| e.kind == ExchangeKind::Probe && !e.content.is_empty());
        if already {
            tracing::debug!(
                target: "deep_dive",
                session_id = %session.id,
                "Opening gambit already generated"
            );
            return Vec::new();
        }

        if triage::is_crisis(&session.problem) {
            tracing::warn!(
                target: "deep_dive",
                session_id = %session.id,
                "Problem mentions a crisis; sending safety message"
            );
            let analyst = PersonaId::for_thread(ThreadId::Analytical);
            let exchange = Exchange::new(1, analyst, ExchangeKind::Probe, triage::CRISIS_MESSAGE);
            session.push(exchange.clone());
            return vec![exchange];
        }

        let lines = join_all(
            PersonaId::ALL
                .iter()
                .map(|persona| self.content.opening_probe(*persona, &session.problem)),
        )
        .await;

        let exchanges: Vec<Exchange> = PersonaId::ALL
            .into_iter()
            .zip(lines)
            .map(|(persona, line)| Exchange::new(1, persona, ExchangeKind::Probe, line))
            .collect();
        session.exchanges.extend(exchanges.iter().cloned());

        tracing::info!(target: "deep_dive", session_id = %session.id, "Opening gambit generated");
        exchanges
    }

    /// Records the user's answer to `persona` and scores it.
    ///
    /// The answer attaches to that persona's oldest open question in the
    /// current round; with no open question it is kept as an unsolicited
    /// answer. Ignored while the session is not taking answers.
    pub async fn process_answer(
        &self,
        session: &mut DeepDiveSession,
        persona: PersonaId,
        answer: &str,
    ) -> AnswerOutcome {
        if !session.phase.accepts_answers() {
            tracing::debug!(target: "deep_dive", phase = %session.phase, "Answer ignored");
            return AnswerOutcome::default();
        }

        let answer = answer.trim();
        match session.open_question_for(persona) {
            Some(index) => {
                session.exchanges[index].attach_answer(answer);
            }
            None => {
                tracing::debug!(
                    target: "deep_dive",
                    persona = persona.get(),
                    "No open question; recording unsolicited answer"
                );
                let mut exchange = Exchange::new(session.round(), persona, ExchangeKind::Probe, "");
                exchange.attach_answer(answer);
                session.push(exchange);
            }
        }

        let score = self.scorer.score(session, persona, answer);

        let mut follow_ups = Vec::new();
        if session.phase.is_open(Stage::Round2) {
            for thread in &score.activated {
                if let Some(exchange) = self.generate_follow_up(session, thread.persona()).await {
                    follow_ups.push(exchange);
                }
            }
        }

        AnswerOutcome {
            activated: score.activated,
            follow_ups,
        }
    }

    /// Appends one follow-up (or interrupt, on strong signal) from `persona`.
    ///
    /// Returns `None` if the persona already has an open question this round.
    pub async fn generate_follow_up(
        &self,
        session: &mut DeepDiveSession,
        persona: PersonaId,
    ) -> Option<Exchange> {
        if !session.phase.accepts_answers() || session.open_question_for(persona).is_some() {
            return None;
        }

        let interrupt = self.scorer.is_strong(session, persona.thread());
        let context = answer_context(session, persona).to_string();
        let line = self
            .content
            .follow_up(persona, &session.problem, &context, interrupt)
            .await;

        let exchange = Exchange::new(session.round(), persona, follow_up_kind(interrupt), line);
        session.push(exchange.clone());
        Some(exchange)
    }

    /// Appends sulks for personas ignored this round.
    pub fn check_for_sulking(&self, session: &mut DeepDiveSession) -> Vec<Exchange> {
        let sulks = self.sulks.check(session);
        if !sulks.is_empty() {
            let who: Vec<u8> = sulks.iter().map(|e| e.persona_id.get()).collect();
            tracing::info!(
                target: "deep_dive",
                session_id = %session.id,
                sulking = ?who,
                "Personas sulking"
            );
            session.exchanges.extend(sulks.iter().cloned());
        }
        sulks
    }

    /// Whether the current round has what it needs to move on.
    ///
    /// Round 1 needs one answer. Round 2 needs every follow-up answered.
    /// Round 3 needs two active threads and no unanswered follow-up, after
    /// which "advancing" starts the debate. Nothing advances past the debate
    /// except resolving it.
    pub fn should_advance_round(&self, session: &DeepDiveSession) -> bool {
        let pending_follow_ups = |round: u8| {
            session.exchanges_in_round(round).any(|e| {
                matches!(e.kind, ExchangeKind::FollowUp | ExchangeKind::Interrupt) && e.is_open()
            })
        };

        match session.phase.open_stage() {
            Some(Stage::Round1) => session.exchanges_in_round(1).any(Exchange::is_answered),
            Some(Stage::Round2) => !pending_follow_ups(2),
            Some(Stage::Round3Probe) => {
                session.active_threads().len() >= 2 && !pending_follow_ups(3)
            }
            _ => false,
        }
    }

    /// Moves the session forward one step and returns what was appended.
    ///
    /// Returns `None` when [`Self::should_advance_round`] says no. Sulks for
    /// the round being left come first in the returned list.
    pub async fn advance_round(&self, session: &mut DeepDiveSession) -> Option<Vec<Exchange>> {
        if !self.should_advance_round(session) {
            return None;
        }

        let mut produced = self.check_for_sulking(session);
        match session.phase {
            Phase::Open(Stage::Round1) => {
                session.phase = Phase::Open(Stage::Round2);
                produced.extend(self.round_two_follow_ups(session).await);
            }
            Phase::Open(Stage::Round2) => {
                session.phase = Phase::Open(Stage::Round3Probe);
                produced.extend(self.round_three_probes(session).await);
            }
            Phase::Open(Stage::Round3Probe) => {
                produced.extend(self.debate.generate(session).await);
            }
            _ => return None,
        }

        tracing::info!(
            target: "deep_dive",
            session_id = %session.id,
            phase = %session.phase,
            appended = produced.len(),
            "Round advanced"
        );
        Some(produced)
    }

    /// One follow-up per thread with depth, in priority order.
    async fn round_two_follow_ups(&self, session: &mut DeepDiveSession) -> Vec<Exchange> {
        let plans: Vec<(PersonaId, bool, String)> = ThreadId::ALL
            .into_iter()
            .filter(|thread| session.depth(*thread) > 0)
            .map(|thread| {
                let persona = thread.persona();
                let interrupt = self.scorer.is_strong(session, thread);
                (persona, interrupt, answer_context(session, persona).to_string())
            })
            .collect();

        let lines = join_all(plans.iter().map(|(persona, interrupt, answer)| {
            self.content
                .follow_up(*persona, &session.problem, answer, *interrupt)
        }))
        .await;

        let round = session.round();
        let exchanges: Vec<Exchange> = plans
            .into_iter()
            .zip(lines)
            .map(|((persona, interrupt, _), line)| {
                Exchange::new(round, persona, follow_up_kind(interrupt), line)
            })
            .collect();
        session.exchanges.extend(exchanges.iter().cloned());
        exchanges
    }

    /// A last-chance probe from every persona whose thread is still inactive.
    ///
    /// Only dormant personas are eligible: active ones already asked their
    /// round-2 follow-ups and can still be asked for more with
    /// [`Self::generate_follow_up`].
    async fn round_three_probes(&self, session: &mut DeepDiveSession) -> Vec<Exchange> {
        let dormant: Vec<PersonaId> = PersonaId::ALL
            .into_iter()
            .filter(|persona| !session.is_active(persona.thread()))
            .collect();

        let lines = join_all(
            dormant
                .iter()
                .map(|persona| self.content.opening_probe(*persona, &session.problem)),
        )
        .await;

        let round = session.round();
        let exchanges: Vec<Exchange> = dormant
            .into_iter()
            .zip(lines)
            .map(|(persona, line)| Exchange::new(round, persona, ExchangeKind::Probe, line))
            .collect();
        session.exchanges.extend(exchanges.iter().cloned());
        exchanges
    }
}

fn follow_up_kind(interrupt: bool) -> ExchangeKind {
    if interrupt {
        ExchangeKind::Interrupt
    } else {
        ExchangeKind::FollowUp
    }
}

/// What the persona last heard from the user, else the latest answer overall.
fn answer_context(session: &DeepDiveSession, persona: PersonaId) -> &str {
    session
        .answers_for(persona)
        .into_iter()
        .rev()
        .find(|a| !a.is_empty())
        .or_else(|| session.latest_answer())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(id: u8) -> PersonaId {
        PersonaId::new(id).unwrap()
    }

    fn controller() -> RoundController {
        RoundController::new(Arc::new(ContentGenerator::offline()), &ScoringConfig::default())
    }

    #[tokio::test]
    async fn test_opening_gambit_runs_once() {
        let rounds = controller();
        let mut session = DeepDiveSession::new("Should I quit my job to start a business?");

        let probes = rounds.generate_opening_gambit(&mut session).await;
        assert_eq!(probes.len(), 4);
        let ids: Vec<u8> = probes.iter().map(|e| e.persona_id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(probes.iter().all(|e| e.round == 1 && !e.content.is_empty()));

        assert!(rounds.generate_opening_gambit(&mut session).await.is_empty());
        assert_eq!(session.exchanges.len(), 4);
    }

    #[tokio::test]
    async fn test_crisis_problem_gets_single_safety_message() {
        let rounds = controller();
        let mut session = DeepDiveSession::new("I want to die and don't know what to do");

        let probes = rounds.generate_opening_gambit(&mut session).await;

        assert_eq!(probes.len(), 1);
        assert_eq!(probes[0].persona_id, persona(3));
        assert_eq!(probes[0].content, triage::CRISIS_MESSAGE);
    }

    #[tokio::test]
    async fn test_answer_attaches_and_scores() {
        let rounds = controller();
        let mut session = DeepDiveSession::new("Should I quit my job to start a business?");
        rounds.generate_opening_gambit(&mut session).await;

        let outcome = rounds
            .process_answer(&mut session, persona(4), "I'd register the LLC this week")
            .await;

        assert_eq!(outcome.activated, vec![ThreadId::Pragmatic]);
        assert!(outcome.follow_ups.is_empty());
        let rocky = session.exchanges.iter().find(|e| e.persona_id == persona(4)).unwrap();
        assert_eq!(rocky.user_answer.as_deref(), Some("I'd register the LLC this week"));
    }

    #[tokio::test]
    async fn test_unsolicited_answer_is_recorded() {
        let rounds = controller();
        let mut session = DeepDiveSession::new("p");

        rounds.process_answer(&mut session, persona(2), "I'm afraid").await;

        assert_eq!(session.exchanges.len(), 1);
        assert!(session.exchanges[0].content.is_empty());
        assert!(session.is_active(ThreadId::Psychological));
    }

    #[tokio::test]
    async fn test_answers_ignored_during_debate() {
        let rounds = controller();
        let mut session = DeepDiveSession::new("p");
        session.phase = Phase::Open(Stage::Round3Debate);

        let outcome = rounds.process_answer(&mut session, persona(1), "my wife").await;

        assert_eq!(outcome, AnswerOutcome::default());
        assert!(session.exchanges.is_empty());
    }

    #[tokio::test]
    async fn test_round_one_needs_an_answer() {
        let rounds = controller();
        let mut session = DeepDiveSession::new("p");
        rounds.generate_opening_gambit(&mut session).await;

        assert!(!rounds.should_advance_round(&session));
        assert!(rounds.advance_round(&mut session).await.is_none());
        assert_eq!(session.round(), 1);
    }

    #[tokio::test]
    async fn test_advance_to_round_two_follows_up_on_active_threads() {
        let rounds = controller();
        let mut session = DeepDiveSession::new("Should I quit my job to start a business?");
        rounds.generate_opening_gambit(&mut session).await;
        rounds
            .process_answer(&mut session, persona(4), "my wife worries about the money")
            .await;

        let produced = rounds.advance_round(&mut session).await.unwrap();

        assert!(session.phase.is_open(Stage::Round2));
        let askers: Vec<u8> = produced.iter().map(|e| e.persona_id.get()).collect();
        assert_eq!(askers, vec![4, 1]);
        assert!(produced.iter().all(|e| e.round == 2));
        assert!(!rounds.should_advance_round(&session));
    }

    #[tokio::test]
    async fn test_strong_signal_becomes_interrupt() {
        let rounds = controller();
        let mut session = DeepDiveSession::new("p");
        rounds.generate_opening_gambit(&mut session).await;
        rounds
            .process_answer(&mut session, persona(4), "money, budget, savings and cost")
            .await;

        let produced = rounds.advance_round(&mut session).await.unwrap();

        assert_eq!(produced[0].kind, ExchangeKind::Interrupt);
    }

    #[tokio::test]
    async fn test_strong_cross_activation_becomes_interrupt() {
        let rounds = controller();
        let mut session = DeepDiveSession::new("Should I quit my job to start a business?");
        rounds.generate_opening_gambit(&mut session).await;
        rounds
            .process_answer(
                &mut session,
                persona(4),
                "my wife, my kids, my parents and my friends all depend on me",
            )
            .await;

        let produced = rounds.advance_round(&mut session).await.unwrap();

        let kinds: Vec<(u8, ExchangeKind)> = produced
            .iter()
            .map(|e| (e.persona_id.get(), e.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![(4, ExchangeKind::FollowUp), (1, ExchangeKind::Interrupt)]
        );
    }

    #[tokio::test]
    async fn test_round_two_activation_triggers_follow_up() {
        let rounds = controller();
        let mut session = DeepDiveSession::new("p");
        rounds.generate_opening_gambit(&mut session).await;
        rounds.process_answer(&mut session, persona(4), "runway").await;
        rounds.advance_round(&mut session).await;

        let outcome = rounds
            .process_answer(&mut session, persona(4), "honestly I'm scared of failing")
            .await;

        assert_eq!(outcome.activated, vec![ThreadId::Psychological]);
        assert_eq!(outcome.follow_ups.len(), 1);
        assert_eq!(outcome.follow_ups[0].persona_id, persona(2));
    }

    #[tokio::test]
    async fn test_round_three_probes_dormant_personas() {
        let rounds = controller();
        let mut session = DeepDiveSession::new("p");
        session.thread_mut(ThreadId::Pragmatic).deepen(1);
        session.phase = Phase::Open(Stage::Round2);

        let produced = rounds.advance_round(&mut session).await.unwrap();

        assert!(session.phase.is_open(Stage::Round3Probe));
        let probes: Vec<u8> = produced
            .iter()
            .filter(|e| e.kind == ExchangeKind::Probe)
            .map(|e| e.persona_id.get())
            .collect();
        assert_eq!(probes, vec![1, 2, 3]);
        assert!(
            produced
                .iter()
                .any(|e| e.kind == ExchangeKind::Sulk && e.persona_id == persona(4))
        );
    }

    #[tokio::test]
    async fn test_round_three_advance_starts_debate_once() {
        let rounds = controller();
        let mut session = DeepDiveSession::new("p");
        session.thread_mut(ThreadId::Pragmatic).deepen(1);
        session.thread_mut(ThreadId::Social).deepen(1);
        session.phase = Phase::Open(Stage::Round3Probe);

        let produced = rounds.advance_round(&mut session).await.unwrap();
        assert!(produced.iter().any(|e| e.kind == ExchangeKind::Debate));
        assert!(session.phase.debate_in_progress());

        assert!(rounds.advance_round(&mut session).await.is_none());
        assert_eq!(session.round(), 3);
    }

    #[tokio::test]
    async fn test_sulks_are_not_repeated() {
        let rounds = controller();
        let mut session = DeepDiveSession::new("p");
        session.thread_mut(ThreadId::Social).deepen(1);
        session.phase = Phase::Open(Stage::Round2);

        assert_eq!(rounds.check_for_sulking(&mut session).len(), 1);
        assert!(rounds.check_for_sulking(&mut session).is_empty());
    }
}
