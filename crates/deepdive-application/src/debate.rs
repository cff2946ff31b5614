//! Round-3 council debate.

use deepdive_core::persona::PersonaId;
use deepdive_core::session::{DeepDiveSession, Exchange, ExchangeKind, Phase, Stage};
use deepdive_core::thread::ThreadId;
use std::sync::Arc;

use crate::content::ContentGenerator;

/// Answers quoted as debate context, most recent last.
const CONTEXT_ANSWERS: usize = 3;

/// Runs the debate between personas whose threads are active.
#[derive(Clone)]
pub struct DebateOrchestrator {
    content: Arc<ContentGenerator>,
}

impl DebateOrchestrator {
    pub fn new(content: Arc<ContentGenerator>) -> Self {
        Self { content }
    }

    /// Whether a debate may start now.
    pub fn can_start(&self, session: &DeepDiveSession) -> bool {
        session.phase.is_open(Stage::Round3Probe) && session.active_threads().len() >= 2
    }

    /// Speaking order: deepest thread first, ties by thread priority.
    pub fn speakers(&self, session: &DeepDiveSession) -> Vec<PersonaId> {
        let mut active = session.active_threads();
        active.sort_by(|a, b| session.depth(*b).cmp(&session.depth(*a)));
        active.into_iter().map(ThreadId::persona).collect()
    }

    /// Enters the debate and appends its lines.
    ///
    /// Each speaker talks once, rebutting the one before; the opener closes by
    /// rebutting the last speaker. Returns nothing (and changes nothing) unless
    /// the session is in the round-3 probe stage with at least two active threads.
    pub async fn generate(&self, session: &mut DeepDiveSession) -> Vec<Exchange> {
        if !self.can_start(session) {
            tracing::debug!(
                target: "deep_dive",
                phase = %session.phase,
                active = session.active_threads().len(),
                "Debate not started"
            );
            return Vec::new();
        }

        session.phase = Phase::Open(Stage::Round3Debate);
        let speakers = self.speakers(session);
        let round = session.round();
        let context = answers_context(session);

        let mut turns: Vec<(PersonaId, PersonaId)> = speakers
            .iter()
            .enumerate()
            .map(|(i, speaker)| {
                let target = if i == 0 { speakers[1] } else { speakers[i - 1] };
                (*speaker, target)
            })
            .collect();
        turns.push((speakers[0], speakers[speakers.len() - 1]));

        let mut exchanges: Vec<Exchange> = Vec::with_capacity(turns.len());
        for (speaker, target) in turns {
            let previous = exchanges.last().map(|e| e.content.as_str());
            let line = self
                .content
                .debate_line(speaker, target, &session.problem, &context, previous)
                .await;
            exchanges.push(Exchange::new(round, speaker, ExchangeKind::Debate, line));
        }

        tracing::info!(
            target: "deep_dive",
            session_id = %session.id,
            speakers = ?speakers,
            "Council debate started"
        );

        session.exchanges.extend(exchanges.iter().cloned());
        exchanges
    }

    /// Records the concern the user sided with and moves to round 4.
    ///
    /// `None` ("skip") picks the first debating persona's thread. Returns the
    /// thread that was deepened, or `None` when no debate is in progress.
    pub fn resolve(
        &self,
        session: &mut DeepDiveSession,
        chosen: Option<ThreadId>,
    ) -> Option<ThreadId> {
        if !session.phase.debate_in_progress() {
            tracing::debug!(target: "deep_dive", phase = %session.phase, "No debate to resolve");
            return None;
        }

        let thread = chosen.or_else(|| first_speaker(session).map(PersonaId::thread))?;
        session.thread_mut(thread).deepen(3);
        session.phase = Phase::Open(Stage::Round4);

        tracing::info!(
            target: "deep_dive",
            session_id = %session.id,
            chosen = %thread,
            skipped = chosen.is_none(),
            "Debate resolved"
        );
        Some(thread)
    }
}

fn first_speaker(session: &DeepDiveSession) -> Option<PersonaId> {
    session
        .exchanges
        .iter()
        .find(|e| e.kind == ExchangeKind::Debate)
        .map(|e| e.persona_id)
}

fn answers_context(session: &DeepDiveSession) -> String {
    let answers: Vec<&str> = session
        .exchanges
        .iter()
        .filter_map(|e| e.user_answer.as_deref())
        .filter(|a| !a.trim().is_empty())
        .collect();
    let start = answers.len().saturating_sub(CONTEXT_ANSWERS);
    answers[start..].join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round3_session(depths: &[(ThreadId, u32)]) -> DeepDiveSession {
        let mut session = DeepDiveSession::new("Should I quit my job to start a business?");
        for (thread, depth) in depths {
            for _ in 0..*depth {
                session.thread_mut(*thread).deepen(1);
            }
        }
        session.phase = Phase::Open(Stage::Round3Probe);
        session
    }

    fn orchestrator() -> DebateOrchestrator {
        DebateOrchestrator::new(Arc::new(ContentGenerator::offline()))
    }

    #[tokio::test]
    async fn test_two_speakers_produce_three_lines() {
        let mut session = round3_session(&[(ThreadId::Pragmatic, 2), (ThreadId::Social, 1)]);

        let lines = orchestrator().generate(&mut session).await;

        let order: Vec<u8> = lines.iter().map(|e| e.persona_id.get()).collect();
        assert_eq!(order, vec![4, 1, 4]);
        assert!(lines.iter().all(|e| e.kind == ExchangeKind::Debate && e.round == 3));
        assert!(session.phase.debate_in_progress());
        assert_eq!(session.exchanges.len(), 3);
    }

    #[tokio::test]
    async fn test_depth_then_priority_ordering() {
        let session = round3_session(&[
            (ThreadId::Social, 3),
            (ThreadId::Analytical, 1),
            (ThreadId::Psychological, 1),
        ]);
        let order: Vec<u8> = orchestrator().speakers(&session).iter().map(|p| p.get()).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_second_call_is_noop() {
        let mut session = round3_session(&[(ThreadId::Pragmatic, 1), (ThreadId::Social, 1)]);
        let debate = orchestrator();
        debate.generate(&mut session).await;
        let snapshot = session.clone();

        assert!(debate.generate(&mut session).await.is_empty());
        assert_eq!(session, snapshot);
    }

    #[tokio::test]
    async fn test_single_active_thread_blocks_debate() {
        let mut session = round3_session(&[(ThreadId::Analytical, 2)]);
        assert!(orchestrator().generate(&mut session).await.is_empty());
        assert!(session.phase.is_open(Stage::Round3Probe));
    }

    #[tokio::test]
    async fn test_resolve_skip_defaults_to_first_speaker() {
        let mut session = round3_session(&[(ThreadId::Pragmatic, 1), (ThreadId::Social, 2)]);
        let debate = orchestrator();
        debate.generate(&mut session).await;

        let chosen = debate.resolve(&mut session, None);

        assert_eq!(chosen, Some(ThreadId::Social));
        assert_eq!(session.depth(ThreadId::Social), 3);
        assert_eq!(session.phase, Phase::Open(Stage::Round4));
        assert_eq!(debate.resolve(&mut session, Some(ThreadId::Pragmatic)), None);
    }

    #[tokio::test]
    async fn test_resolve_chosen_thread_activates_it() {
        let mut session = round3_session(&[(ThreadId::Pragmatic, 1), (ThreadId::Social, 1)]);
        let debate = orchestrator();
        debate.generate(&mut session).await;

        debate.resolve(&mut session, Some(ThreadId::Analytical));

        assert!(session.is_active(ThreadId::Analytical));
        assert_eq!(session.depth(ThreadId::Analytical), 1);
        assert_eq!(session.round(), 4);
    }
}
