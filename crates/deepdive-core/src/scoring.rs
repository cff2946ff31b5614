//! Thread activation scoring.
//!
//! Every answer deepens the answering persona's own thread. The text is then
//! matched against a per-thread keyword lexicon, and any other thread with at
//! least one hit is cross-activated.

use regex::Regex;
use std::collections::BTreeMap;

use crate::config::ScoringConfig;
use crate::persona::PersonaId;
use crate::session::DeepDiveSession;
use crate::thread::ThreadId;

const PRAGMATIC_KEYWORDS: &[&str] = &[
    "money", "cash", "revenue", "cost", "afford", "burn rate", "salary", "income", "savings",
    "invest", "budget", "expense", "profit", "loss", "business", "company", "startup", "scale",
    "growth", "market", "numbers", "calculate", "roi", "funding", "capital",
];

const PSYCHOLOGICAL_KEYWORDS: &[&str] = &[
    "fear", "scared", "worry", "identity", "who am i", "meaning", "purpose", "existential",
    "crisis", "mortality", "legacy", "regret", "stuck", "lost", "confused", "midlife",
    "quarter-life", "transition", "chapter", "phase", "stage", "growing", "aging", "time",
];

const ANALYTICAL_KEYWORDS: &[&str] = &[
    "data", "statistics", "research", "compare", "analyze", "checklist", "evidence", "facts",
    "numbers", "metrics", "measure", "verify", "confirm", "investigate", "study", "report",
    "survey", "information", "logical", "rational", "objective", "criteria",
];

const SOCIAL_KEYWORDS: &[&str] = &[
    "relationship", "family", "friend", "partner", "colleague", "belong", "community",
    "network", "people", "social", "connection", "lonely", "isolated", "support", "parents",
    "children", "spouse", "wife", "husband", "boyfriend", "girlfriend", "team", "group",
];

/// Built-in keywords for one thread.
pub fn builtin_keywords(thread: ThreadId) -> &'static [&'static str] {
    match thread {
        ThreadId::Pragmatic => PRAGMATIC_KEYWORDS,
        ThreadId::Psychological => PSYCHOLOGICAL_KEYWORDS,
        ThreadId::Analytical => ANALYTICAL_KEYWORDS,
        ThreadId::Social => SOCIAL_KEYWORDS,
    }
}

/// Outcome of scoring one answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreOutcome {
    /// Threads that went from inactive to active, in priority order.
    pub activated: Vec<ThreadId>,
    /// Keyword hits per thread for this answer.
    pub hits: BTreeMap<ThreadId, u32>,
}

/// Case-insensitive keyword matcher, one compiled pattern per thread.
///
/// A keyword matches when it starts a word, so "spouse" matches "spouses" but
/// "cost" does not match "accost".
#[derive(Debug, Clone)]
pub struct ThreadActivationScorer {
    patterns: BTreeMap<ThreadId, Regex>,
    strong_signal_hits: u32,
}

impl Default for ThreadActivationScorer {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl ThreadActivationScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        for name in config.unknown_keyword_threads() {
            tracing::warn!("Ignoring extra keywords for unknown thread '{}'", name);
        }

        let patterns = ThreadId::ALL
            .into_iter()
            .filter_map(|thread| {
                let keywords = builtin_keywords(thread)
                    .iter()
                    .map(|kw| kw.to_string())
                    .chain(config.extra_keywords_for(thread).iter().cloned())
                    .filter(|kw| !kw.trim().is_empty())
                    .map(|kw| regex::escape(kw.trim()))
                    .collect::<Vec<_>>();
                let pattern = format!(r"(?i)\b(?:{})", keywords.join("|"));
                match Regex::new(&pattern) {
                    Ok(regex) => Some((thread, regex)),
                    Err(err) => {
                        tracing::error!(
                            "Keyword lexicon for {} failed to compile: {}",
                            thread,
                            err
                        );
                        None
                    }
                }
            })
            .collect();

        Self {
            patterns,
            strong_signal_hits: config.strong_signal_hits,
        }
    }

    /// Counts lexicon hits per thread; threads without hits are omitted.
    pub fn detect(&self, text: &str) -> BTreeMap<ThreadId, u32> {
        self.patterns
            .iter()
            .filter_map(|(thread, regex)| {
                let hits = regex.find_iter(text).count() as u32;
                (hits > 0).then_some((*thread, hits))
            })
            .collect()
    }

    /// Applies one answer from `persona` to the session's threads.
    ///
    /// The persona's own thread always gains one depth, even for an empty
    /// answer. Every other thread with a keyword hit also gains one depth.
    /// Each deepened thread records this answer's hit count as a signal.
    pub fn score(
        &self,
        session: &mut DeepDiveSession,
        persona: PersonaId,
        answer: &str,
    ) -> ScoreOutcome {
        let round = session.round();
        let own = persona.thread();
        let hits = self.detect(answer);
        let mut activated = Vec::new();

        for thread in ThreadId::ALL {
            let thread_hits = hits.get(&thread).copied().unwrap_or(0);
            if thread != own && thread_hits == 0 {
                continue;
            }
            let state = session.thread_mut(thread);
            if state.deepen(round) {
                activated.push(thread);
            }
            state.record_signal(thread_hits);
        }

        tracing::debug!(
            target: "deep_dive",
            persona = persona.get(),
            own = %own,
            ?hits,
            ?activated,
            "Scored answer"
        );

        ScoreOutcome { activated, hits }
    }

    /// Whether a thread has shown enough signal to warrant an interrupt.
    pub fn is_strong(&self, session: &DeepDiveSession, thread: ThreadId) -> bool {
        self.strong_signal_hits > 0
            && session.thread(thread).peak_signal >= self.strong_signal_hits
    }
}
