//! Sulk detection: personas whose thread was opened and then left alone.

use crate::persona::{self, template, PersonaId};
use crate::session::{DeepDiveSession, Exchange, ExchangeKind};

/// Flags personas the user has stopped talking to.
///
/// A persona sulks in round `r` (r ≥ 2) when its thread is active, was last
/// deepened before round `r`, and the persona received no answer in round `r`.
/// At most one sulk per persona per round.
#[derive(Debug, Clone, Copy, Default)]
pub struct SulkDetector;

impl SulkDetector {
    /// Returns new sulk exchanges for the current round. Does not modify the session.
    pub fn check(&self, session: &DeepDiveSession) -> Vec<Exchange> {
        let round = session.round();
        if round < 2 || session.phase.is_complete() {
            return Vec::new();
        }

        let context = session.latest_answer().unwrap_or_default();
        let placeholders = template::Placeholders::extract(context, &session.problem);

        PersonaId::ALL
            .into_iter()
            .filter(|persona| self.is_sulking(session, *persona, round))
            .map(|persona| {
                let bank = persona::profile(persona).probes.sulk;
                let line = template::render(template::pick(bank), &placeholders);
                Exchange::new(round, persona, ExchangeKind::Sulk, line)
            })
            .collect()
    }

    fn is_sulking(&self, session: &DeepDiveSession, persona: PersonaId, round: u8) -> bool {
        let thread = session.thread(persona.thread());
        let stale = thread.active && thread.last_activated_round.is_some_and(|r| r < round);
        let already = session
            .exchanges_in_round(round)
            .any(|e| e.persona_id == persona && e.kind == ExchangeKind::Sulk);

        stale && !already && !session.answered_in_round(persona, round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Phase, Stage};
    use crate::thread::ThreadId;

    fn persona(id: u8) -> PersonaId {
        PersonaId::new(id).unwrap()
    }

    fn session_in_round2_with_active(threads: &[ThreadId]) -> DeepDiveSession {
        let mut session = DeepDiveSession::new("Should I move to Lisbon?");
        for thread in threads {
            session.thread_mut(*thread).deepen(1);
        }
        session.phase = Phase::Open(Stage::Round2);
        session
    }

    #[test]
    fn test_no_sulks_in_round_one() {
        let mut session = DeepDiveSession::new("p");
        session.thread_mut(ThreadId::Social).deepen(1);
        assert!(SulkDetector.check(&session).is_empty());
    }

    #[test]
    fn test_ignored_active_thread_sulks_once() {
        let mut session = session_in_round2_with_active(&[ThreadId::Social, ThreadId::Pragmatic]);
        let mut answered = Exchange::new(2, persona(4), ExchangeKind::FollowUp, "Runway?");
        answered.attach_answer("Eight months");
        session.push(answered);

        let sulks = SulkDetector.check(&session);
        assert_eq!(sulks.len(), 1);
        assert_eq!(sulks[0].persona_id, persona(1));
        assert_eq!(sulks[0].kind, ExchangeKind::Sulk);
        assert_eq!(sulks[0].round, 2);
        assert!(sulks[0].user_answer.is_none());

        session.exchanges.extend(sulks);
        assert!(SulkDetector.check(&session).is_empty());
    }

    #[test]
    fn test_thread_deepened_this_round_does_not_sulk() {
        let mut session = session_in_round2_with_active(&[ThreadId::Analytical]);
        session.thread_mut(ThreadId::Analytical).deepen(2);
        assert!(SulkDetector.check(&session).is_empty());
    }

    #[test]
    fn test_sulk_leaves_depth_untouched() {
        let session = session_in_round2_with_active(&[ThreadId::Psychological]);
        let before = session.threads.clone();
        let sulks = SulkDetector.check(&session);
        assert_eq!(sulks.len(), 1);
        assert_eq!(session.threads, before);
    }
}
