//! Round-4 hypothesis synthesis.

use deepdive_core::generation::GenerationError;
use deepdive_core::persona::{self, PersonaId, template};
use deepdive_core::session::{DeepDiveSession, Hypothesis, Stage};
use deepdive_core::thread::ThreadId;
use deepdive_interaction::prompts;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::content::ContentGenerator;

static SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[\s*#>-]*(DIAGNOSIS|TEST|CONSEQUENCE)\**\s*:\**\s*(.+)$")
        .expect("section pattern is valid")
});

/// Longest answer excerpt quoted in a fallback diagnosis.
const QUOTE_CHARS: usize = 80;

/// The three sections of a generated hypothesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HypothesisSections {
    pub diagnosis: String,
    pub test: String,
    pub consequence: String,
}

/// Parses `DIAGNOSIS:` / `TEST:` / `CONSEQUENCE:` lines. All three must be present.
pub fn parse_sections(text: &str) -> Option<HypothesisSections> {
    let mut diagnosis = None;
    let mut test = None;
    let mut consequence = None;

    for caps in SECTION_RE.captures_iter(text) {
        let value = caps[2].trim().trim_matches('"').trim().to_string();
        if value.is_empty() {
            continue;
        }
        let slot = match caps[1].to_ascii_uppercase().as_str() {
            "DIAGNOSIS" => &mut diagnosis,
            "TEST" => &mut test,
            _ => &mut consequence,
        };
        slot.get_or_insert(value);
    }

    Some(HypothesisSections {
        diagnosis: diagnosis?,
        test: test?,
        consequence: consequence?,
    })
}

/// Produces one hypothesis per thread.
#[derive(Clone)]
pub struct HypothesisSynthesizer {
    content: Arc<ContentGenerator>,
}

impl HypothesisSynthesizer {
    pub fn new(content: Arc<ContentGenerator>) -> Self {
        Self { content }
    }

    /// Builds all four hypotheses, in thread priority order.
    ///
    /// Returns `None` outside round 4.
    pub async fn synthesize(&self, session: &DeepDiveSession) -> Option<[Hypothesis; 4]> {
        if !session.phase.is_open(Stage::Round4) {
            tracing::debug!(
                target: "deep_dive",
                phase = %session.phase,
                "Hypotheses requested outside round 4"
            );
            return None;
        }

        let [a, b, c, d] = ThreadId::ALL;
        let (a, b, c, d) = tokio::join!(
            self.for_thread(session, a),
            self.for_thread(session, b),
            self.for_thread(session, c),
            self.for_thread(session, d),
        );
        Some([a, b, c, d])
    }

    async fn for_thread(&self, session: &DeepDiveSession, thread: ThreadId) -> Hypothesis {
        let persona = thread.persona();
        let grounding = session.grounding_answers(thread);
        let informed = session.is_informed(thread);

        let generated = if informed {
            self.generated(session, persona, &grounding).await
        } else {
            None
        };
        let sections = generated.unwrap_or_else(|| framed(session, persona, &grounding, informed));

        Hypothesis {
            thread_id: thread,
            persona_id: persona,
            title: format!("The {} Hypothesis", persona::profile(persona).name),
            diagnosis: sections.diagnosis,
            test: sections.test,
            consequence: sections.consequence,
        }
    }

    async fn generated(
        &self,
        session: &DeepDiveSession,
        persona: PersonaId,
        answers: &[&str],
    ) -> Option<HypothesisSections> {
        let profile = persona::profile(persona);
        let request = prompts::hypothesis(
            profile,
            &session.problem,
            answers,
            self.content.max_tokens(),
        );
        match self.content.complete(request).await {
            Ok(text) => {
                let parsed = parse_sections(&text);
                if parsed.is_none() {
                    tracing::warn!(
                        "Hypothesis for {} was not in the expected format; using template",
                        profile.name
                    );
                }
                parsed
            }
            Err(GenerationError::Unavailable(reason)) => {
                tracing::trace!("Hypothesis for {} from template ({})", profile.name, reason);
                None
            }
            Err(err) => {
                tracing::warn!(
                    "Hypothesis generation for {} failed, using template: {}",
                    profile.name,
                    err
                );
                None
            }
        }
    }
}

/// Persona framing, quoting the user when there is something to quote.
fn framed(
    session: &DeepDiveSession,
    persona: PersonaId,
    answers: &[&str],
    informed: bool,
) -> HypothesisSections {
    let framing = &persona::profile(persona).hypothesis;
    let latest = answers.last().copied().unwrap_or_default();
    let placeholders = template::Placeholders::extract(latest, &session.problem);

    if !informed {
        return HypothesisSections {
            diagnosis: template::render(framing.uninformed_diagnosis, &placeholders),
            test: template::render(framing.test, &placeholders),
            consequence: template::render(framing.uninformed_consequence, &placeholders),
        };
    }

    let quote: String = latest.trim().chars().take(QUOTE_CHARS).collect();
    HypothesisSections {
        diagnosis: format!(
            "{} You said: \"{}\".",
            template::render(framing.diagnosis, &placeholders),
            quote.trim_end()
        ),
        test: template::render(framing.test, &placeholders),
        consequence: template::render(framing.consequence, &placeholders),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedGenerator;
    use deepdive_core::config::GenerationConfig;
    use deepdive_core::session::{Exchange, ExchangeKind, Phase};

    fn round4(session: &mut DeepDiveSession) {
        session.phase = Phase::Open(Stage::Round4);
    }

    fn offline() -> HypothesisSynthesizer {
        HypothesisSynthesizer::new(Arc::new(ContentGenerator::offline()))
    }

    #[test]
    fn test_parse_sections_tolerates_markdown() {
        let text = "**DIAGNOSIS:** You're scared of the money.\n- TEST: Build a budget this week.\nCONSEQUENCE: \"If you don't, you'll drift.\"";
        let sections = parse_sections(text).unwrap();
        assert_eq!(sections.diagnosis, "You're scared of the money.");
        assert_eq!(sections.test, "Build a budget this week.");
        assert_eq!(sections.consequence, "If you don't, you'll drift.");
    }

    #[test]
    fn test_parse_sections_requires_all_three() {
        assert!(parse_sections("DIAGNOSIS: x\nTEST: y").is_none());
    }

    #[tokio::test]
    async fn test_outside_round4_is_none() {
        let session = DeepDiveSession::new("p");
        assert!(offline().synthesize(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_zero_activation_yields_four_uninformed() {
        let mut session = DeepDiveSession::new("Should I move abroad?");
        round4(&mut session);

        let hypotheses = offline().synthesize(&session).await.unwrap();

        let order: Vec<ThreadId> = hypotheses.iter().map(|h| h.thread_id).collect();
        assert_eq!(order, ThreadId::ALL.to_vec());
        assert!(ThreadId::ALL.iter().all(|t| !session.is_informed(*t)));
        assert!(hypotheses[0].diagnosis.contains("wasn't consulted"));
        assert_eq!(hypotheses[0].title, "The Rocky Hypothesis");
    }

    #[tokio::test]
    async fn test_fallback_quotes_the_user() {
        let mut session = DeepDiveSession::new("Should I quit my job to start a business?");
        let rocky = PersonaId::new(4).unwrap();
        let mut probe = Exchange::new(1, rocky, ExchangeKind::Probe, "Runway?");
        probe.attach_answer("I'd register the LLC this week");
        session.push(probe);
        session.thread_mut(ThreadId::Pragmatic).deepen(1);
        round4(&mut session);

        let hypotheses = offline().synthesize(&session).await.unwrap();

        assert!(session.is_informed(ThreadId::Pragmatic));
        assert!(hypotheses[0].diagnosis.contains("\"I'd register the LLC this week\""));
        assert!(!session.is_informed(ThreadId::Psychological));
        assert!(hypotheses[1].diagnosis.contains("wasn't consulted"));
    }

    #[tokio::test]
    async fn test_generated_sections_are_used() {
        let generator = Arc::new(ScriptedGenerator::new([
            "DIAGNOSIS: Runway anxiety.\nTEST: Price out 8 months this week.\nCONSEQUENCE: If not, you stall.",
        ]));
        let content = ContentGenerator::new(generator, &GenerationConfig::default());
        let synthesizer = HypothesisSynthesizer::new(Arc::new(content));

        let mut session = DeepDiveSession::new("p");
        let rocky = PersonaId::new(4).unwrap();
        let mut probe = Exchange::new(1, rocky, ExchangeKind::Probe, "Runway?");
        probe.attach_answer("six months");
        session.push(probe);
        session.thread_mut(ThreadId::Pragmatic).deepen(1);
        round4(&mut session);

        let hypotheses = synthesizer.synthesize(&session).await.unwrap();
        assert_eq!(hypotheses[0].diagnosis, "Runway anxiety.");
        assert_eq!(hypotheses[0].test, "Price out 8 months this week.");
    }
}
