//! Thread identifiers and per-thread investigation state.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::persona::PersonaId;

/// One of the four interpretive lenses.
///
/// Declaration order is the fixed tie-break priority:
/// pragmatic > psychological > analytical > social.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ThreadId {
    Pragmatic,
    Psychological,
    Analytical,
    Social,
}

impl ThreadId {
    /// All threads in priority order.
    pub const ALL: [ThreadId; 4] = [
        ThreadId::Pragmatic,
        ThreadId::Psychological,
        ThreadId::Analytical,
        ThreadId::Social,
    ];

    /// Position in the tie-break order (0 wins).
    pub fn priority(self) -> usize {
        self as usize
    }

    /// The persona that owns this thread.
    pub fn persona(self) -> PersonaId {
        PersonaId::for_thread(self)
    }

    /// Short phrase naming what this thread worries about.
    pub fn concern(self) -> &'static str {
        match self {
            ThreadId::Pragmatic => "practical realities",
            ThreadId::Psychological => "deeper meaning",
            ThreadId::Analytical => "concrete data",
            ThreadId::Social => "relationships",
        }
    }
}

/// Investigation state for a single thread.
///
/// `depth` only ever grows within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
    pub active: bool,
    pub depth: u32,
    /// Round in which the thread last gained depth.
    #[serde(default)]
    pub last_activated_round: Option<u8>,
    /// Highest number of own-lexicon hits seen in one answer.
    #[serde(default)]
    pub peak_signal: u32,
}

impl Thread {
    pub fn new(id: ThreadId) -> Self {
        Self {
            id,
            active: false,
            depth: 0,
            last_activated_round: None,
            peak_signal: 0,
        }
    }

    /// Marks the thread active and deepens it by one.
    ///
    /// Returns `true` when the thread was inactive before this call.
    pub fn deepen(&mut self, round: u8) -> bool {
        let newly_active = !self.active;
        self.active = true;
        self.depth += 1;
        self.last_activated_round = Some(round);
        newly_active
    }

    pub fn record_signal(&mut self, hits: u32) {
        self.peak_signal = self.peak_signal.max(hits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_priority_follows_declaration_order() {
        let ordered: Vec<ThreadId> = ThreadId::iter().collect();
        assert_eq!(ordered, ThreadId::ALL.to_vec());
        assert!(ThreadId::Pragmatic < ThreadId::Social);
        assert_eq!(ThreadId::Analytical.priority(), 2);
    }

    #[test]
    fn test_thread_id_string_forms() {
        assert_eq!(ThreadId::Psychological.to_string(), "psychological");
        assert_eq!(ThreadId::from_str("social").unwrap(), ThreadId::Social);
        assert_eq!(
            serde_json::to_string(&ThreadId::Pragmatic).unwrap(),
            "\"pragmatic\""
        );
    }

    #[test]
    fn test_deepen_reports_first_activation_only() {
        let mut thread = Thread::new(ThreadId::Social);
        assert!(thread.deepen(1));
        assert!(!thread.deepen(2));
        assert_eq!(thread.depth, 2);
        assert_eq!(thread.last_activated_round, Some(2));
    }

    #[test]
    fn test_record_signal_keeps_peak() {
        let mut thread = Thread::new(ThreadId::Analytical);
        thread.record_signal(3);
        thread.record_signal(1);
        assert_eq!(thread.peak_signal, 3);
    }
}
